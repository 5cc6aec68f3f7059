//! # Ledger Client Service
//!
//! Drives the node over an `RpcTransport`: gas estimation, signed
//! submission, bounded receipt polling and code existence checks.
//!
//! ## Bounded Retries
//!
//! | Operation | Retries |
//! |-----------|---------|
//! | Gas estimation | none |
//! | Receipt polling | `ReceiptPolicy::max_attempts` at `ReceiptPolicy::interval` |
//! | Everything else | none |

use crate::domain::{
    decode_address, encode_args, encode_call, getter_signature, selector, AddressResolution,
    CallObject, CallParams, Deployment, GasQuote, LegacyTransaction, TransactionReceipt,
};
use crate::errors::{LedgerError, RpcError};
use crate::ports::{LedgerApi, RpcTransport};
use async_trait::async_trait;
use lx_01_key_vault::{BalanceSource, Credentials, VaultError};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared_types::{
    parse_quantity, parse_quantity_u64, Address, Bytes, ConstructorArg, TxHash, U256,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Simulated gas is multiplied by this before use as the gas limit.
pub const GAS_LIMIT_MULTIPLIER: u64 = 2;

/// Receipt polling schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolicy {
    /// Pause after each unanswered poll.
    pub interval: Duration,
    /// Polls before giving up.
    pub max_attempts: u32,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            max_attempts: 40,
        }
    }
}

impl ReceiptPolicy {
    /// Longest time a caller can be kept waiting.
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Ledger client configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Chain id transactions are signed for.
    pub chain_id: u64,
    /// Per-request timeout of the HTTP transport.
    pub request_timeout: Duration,
    /// Receipt polling schedule.
    pub receipt: ReceiptPolicy,
    /// Read-only getter whose revert marks a contract as destroyed.
    pub destroyed_getter: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: 1337,
            request_timeout: Duration::from_secs(10),
            receipt: ReceiptPolicy::default(),
            destroyed_getter: "isDestroyed()".to_string(),
        }
    }
}

/// Ledger client statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStats {
    /// Transactions accepted by the node.
    pub transactions_sent: u64,
    /// Receipt polls issued.
    pub receipt_polls: u64,
    /// Gas estimates served.
    pub gas_estimates: u64,
}

#[derive(Default)]
struct StatCounters {
    transactions_sent: AtomicU64,
    receipt_polls: AtomicU64,
    gas_estimates: AtomicU64,
}

/// The Ledger Client.
pub struct LedgerClient<T: RpcTransport> {
    config: LedgerConfig,
    transport: Arc<T>,
    shutdown: Option<watch::Receiver<bool>>,
    stats: StatCounters,
}

impl<T: RpcTransport> LedgerClient<T> {
    /// Create a client speaking to the node through `transport`.
    pub fn new(config: LedgerConfig, transport: Arc<T>) -> Self {
        Self {
            config,
            transport,
            shutdown: None,
            stats: StatCounters::default(),
        }
    }

    /// Abort receipt polling inside `deploy` once `shutdown` turns `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Get current client statistics.
    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            transactions_sent: self.stats.transactions_sent.load(Ordering::Relaxed),
            receipt_polls: self.stats.receipt_polls.load(Ordering::Relaxed),
            gas_estimates: self.stats.gas_estimates.load(Ordering::Relaxed),
        }
    }

    async fn rpc<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, LedgerError> {
        let value = self.transport.request(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| LedgerError::Connection(format!("unexpected {method} result: {e}")))
    }

    async fn quantity(&self, method: &str, params: Value) -> Result<U256, LedgerError> {
        let raw: String = self.rpc(method, params).await?;
        Ok(parse_quantity(&raw)?)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, LedgerError> {
        let raw: String = self
            .rpc("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        Ok(parse_quantity_u64(&raw)?)
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes, LedgerError> {
        let call = CallObject {
            to: Some(to),
            data: Some(Bytes::from(data)),
            ..CallObject::default()
        };
        self.rpc("eth_call", json!([call, "latest"])).await
    }

    /// Estimates, signs and submits. Returns once the node accepted the
    /// transaction.
    async fn submit(
        &self,
        params: CallParams,
        signer: &Credentials,
    ) -> Result<(TxHash, GasQuote), LedgerError> {
        let gas = self.estimate_gas(&params).await?;
        let tx = LegacyTransaction {
            nonce: params.nonce.unwrap_or_default(),
            gas_price: gas.gas_price,
            gas_limit: gas.gas_limit,
            to: params.to,
            value: params.value,
            data: params.data.into_vec(),
            chain_id: self.config.chain_id,
        };
        let signed = tx.sign(signer)?;

        let accepted = self
            .transport
            .request("eth_sendRawTransaction", json!([signed.raw]))
            .await
            .map_err(|e| LedgerError::DeploymentFailed(e.detail()))?;
        let tx_hash = match serde_json::from_value::<TxHash>(accepted) {
            Ok(node_hash) if node_hash != signed.hash => {
                warn!(local = %signed.hash, node = %node_hash, "Node reported a different transaction hash");
                node_hash
            }
            Ok(node_hash) => node_hash,
            Err(_) => signed.hash,
        };

        self.stats.transactions_sent.fetch_add(1, Ordering::Relaxed);
        Ok((tx_hash, gas))
    }
}

fn is_cancelled(cancel: &Option<watch::Receiver<bool>>) -> bool {
    cancel.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Resolves once the flag turns `true`; never, if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl<T: RpcTransport> LedgerApi for LedgerClient<T> {
    fn build_deployment_context(
        &self,
        bytecode: &Bytes,
        args: &[ConstructorArg],
    ) -> Result<Bytes, LedgerError> {
        if bytecode.is_empty() {
            return Err(LedgerError::InvalidArtifact("bytecode is empty".into()));
        }
        Ok(Bytes::from(encode_args(args)))
    }

    #[instrument(skip(self, params), fields(to = ?params.to, data_len = params.data.len()))]
    async fn estimate_gas(&self, params: &CallParams) -> Result<GasQuote, LedgerError> {
        let gas_price = self.quantity("eth_gasPrice", json!([])).await?;

        let simulated = match self
            .transport
            .request("eth_estimateGas", json!([CallObject::from(params)]))
            .await
        {
            Ok(Value::String(raw)) => parse_quantity(&raw)
                .map_err(|e| LedgerError::GasEstimationFailed(e.to_string()))?,
            Ok(other) => {
                return Err(LedgerError::GasEstimationFailed(format!(
                    "unexpected estimate {other}"
                )))
            }
            Err(RpcError::Transport(msg)) => return Err(LedgerError::Connection(msg)),
            Err(e) => return Err(LedgerError::GasEstimationFailed(e.detail())),
        };

        if simulated.is_zero() {
            return Err(LedgerError::GasEstimationFailed(
                "simulation returned zero gas".into(),
            ));
        }

        let quote = GasQuote {
            gas_price,
            gas_limit: simulated.saturating_mul(U256::from(GAS_LIMIT_MULTIPLIER)),
        };
        self.stats.gas_estimates.fetch_add(1, Ordering::Relaxed);
        debug!(%simulated, gas_limit = %quote.gas_limit, gas_price = %quote.gas_price, "Gas estimated");
        Ok(quote)
    }

    #[instrument(skip_all, fields(bytecode_len = bytecode.len(), signer = %signer.address()))]
    async fn deploy(
        &self,
        bytecode: &Bytes,
        encoded_args: &Bytes,
        signer: &Credentials,
    ) -> Result<Deployment, LedgerError> {
        if bytecode.is_empty() {
            return Err(LedgerError::InvalidArtifact("bytecode is empty".into()));
        }
        let mut data = bytecode.as_slice().to_vec();
        data.extend_from_slice(encoded_args.as_slice());

        let from = signer.address();
        let params = CallParams {
            from: Some(from),
            nonce: Some(self.pending_nonce(from).await?),
            to: None,
            value: U256::zero(),
            data: Bytes::from(data),
        };

        let (tx_hash, gas) = self.submit(params, signer).await?;
        info!(%tx_hash, "Deployment submitted");

        let receipt = self.wait_for_receipt(tx_hash, self.shutdown.clone()).await?;
        if !receipt.succeeded() {
            return Err(LedgerError::DeploymentFailed(format!(
                "transaction {tx_hash} failed on-chain"
            )));
        }
        let address = receipt.contract_address.ok_or_else(|| {
            LedgerError::DeploymentFailed(format!("receipt for {tx_hash} carries no contract address"))
        })?;

        info!(%tx_hash, %address, "Contract deployed");
        Ok(Deployment {
            address,
            tx_hash,
            gas,
        })
    }

    #[instrument(skip(self, cancel))]
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> Result<TransactionReceipt, LedgerError> {
        let policy = self.config.receipt;

        for attempt in 1..=policy.max_attempts {
            if is_cancelled(&cancel) {
                return Err(LedgerError::polling_cancelled());
            }

            self.stats.receipt_polls.fetch_add(1, Ordering::Relaxed);
            match self.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    debug!(attempt, "Receipt received");
                    return Ok(receipt);
                }
                Ok(None) => debug!(attempt, "Transaction pending"),
                Err(e) => warn!(attempt, error = %e, "Receipt poll failed"),
            }

            match cancel.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        _ = tokio::time::sleep(policy.interval) => {}
                        _ = cancelled(rx) => return Err(LedgerError::polling_cancelled()),
                    }
                }
                None => tokio::time::sleep(policy.interval).await,
            }
        }

        warn!(attempts = policy.max_attempts, "No receipt, giving up");
        Err(LedgerError::receipt_not_found())
    }

    #[instrument(skip(self))]
    async fn does_contract_exist(&self, address: &str) -> Result<bool, LedgerError> {
        let address: Address = address.parse()?;

        let code: Bytes = self.rpc("eth_getCode", json!([address, "latest"])).await?;
        if code.is_empty() {
            debug!(%address, "No code at address");
            return Ok(false);
        }

        let check = CallObject {
            to: Some(address),
            data: Some(Bytes::from(
                selector(&getter_signature(&self.config.destroyed_getter)).to_vec(),
            )),
            ..CallObject::default()
        };
        match self
            .transport
            .request("eth_call", json!([check, "latest"]))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_revert() => {
                debug!(%address, "Destroyed getter reverted");
                Ok(false)
            }
            Err(RpcError::Transport(msg)) => Err(LedgerError::Connection(msg)),
            Err(e) => {
                debug!(%address, error = %e, "Destroyed getter failed without revert");
                Ok(true)
            }
        }
    }

    #[instrument(skip(self, args, signer), fields(signer = %signer.address()))]
    async fn invoke_function(
        &self,
        address: Address,
        name: &str,
        args: &[ConstructorArg],
        value: U256,
        signer: &Credentials,
    ) -> Result<TxHash, LedgerError> {
        let from = signer.address();
        let params = CallParams {
            from: Some(from),
            nonce: Some(self.pending_nonce(from).await?),
            to: Some(address),
            value,
            data: Bytes::from(encode_call(name, args)),
        };

        let (tx_hash, _) = self.submit(params, signer).await?;
        info!(%tx_hash, function = name, "Function call submitted");
        Ok(tx_hash)
    }

    #[instrument(skip(self, getters), fields(getters = getters.len()))]
    async fn resolve_addresses(
        &self,
        address: Address,
        getters: &[String],
    ) -> BTreeMap<String, AddressResolution> {
        let mut resolved = BTreeMap::new();
        for getter in getters {
            let data = selector(&getter_signature(getter)).to_vec();
            let outcome = match self.call(address, data).await {
                Ok(ret) => decode_address(ret.as_slice()),
                Err(e) => Err(e),
            };
            let entry = match outcome {
                Ok(found) => AddressResolution::Resolved(found),
                Err(e) => {
                    debug!(getter = %getter, error = %e, "Getter failed");
                    AddressResolution::Failed(e.to_string())
                }
            };
            resolved.insert(getter.clone(), entry);
        }
        resolved
    }

    async fn get_balance(&self, address: Address) -> Result<U256, LedgerError> {
        self.quantity("eth_getBalance", json!([address, "latest"]))
            .await
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, LedgerError> {
        self.rpc("eth_getTransactionReceipt", json!([tx_hash])).await
    }

    async fn chain_id(&self) -> Result<u64, LedgerError> {
        let raw: String = self.rpc("eth_chainId", json!([])).await?;
        Ok(parse_quantity_u64(&raw)?)
    }
}

#[async_trait]
impl<T: RpcTransport> BalanceSource for LedgerClient<T> {
    async fn balance_of(&self, address: Address) -> Result<U256, VaultError> {
        self.get_balance(address)
            .await
            .map_err(|e| VaultError::BalanceUnavailable(e.to_string()))
    }
}
