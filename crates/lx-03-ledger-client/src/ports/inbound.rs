//! # Inbound Ports (Driving Ports)
//!
//! The ledger operations the lifecycle layer drives.

use crate::domain::{
    infer_arg, AddressResolution, CallParams, Deployment, GasQuote, TransactionReceipt,
};
use crate::errors::LedgerError;
use async_trait::async_trait;
use lx_01_key_vault::Credentials;
use serde_json::Value;
use shared_types::{Address, Bytes, ConstructorArg, TxHash, U256};
use std::collections::BTreeMap;
use tokio::sync::watch;

/// Ledger Client API.
///
/// Every operation may fail with a connection error wrapping the transport
/// failure.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Validates `bytecode` and ABI-encodes the constructor arguments.
    ///
    /// Returns the encoded arguments only; the caller appends them to the
    /// bytecode at submission.
    fn build_deployment_context(
        &self,
        bytecode: &Bytes,
        args: &[ConstructorArg],
    ) -> Result<Bytes, LedgerError>;

    /// [`build_deployment_context`](Self::build_deployment_context) for
    /// callers holding untyped JSON arguments, typed by their shape.
    ///
    /// | Input | Type |
    /// |-------|------|
    /// | `"0x"` + 40 hex digits | `address` |
    /// | `"123"` (digits only) | `uint256` |
    /// | any other string | `string` |
    /// | non-negative integer | `uint256` |
    /// | `true` / `false` | `bool` |
    ///
    /// Anything else fails with `InvalidArtifact`.
    fn build_deployment_context_untyped(
        &self,
        bytecode: &Bytes,
        args: &[Value],
    ) -> Result<Bytes, LedgerError> {
        let typed = args.iter().map(infer_arg).collect::<Result<Vec<_>, _>>()?;
        self.build_deployment_context(bytecode, &typed)
    }

    /// Current gas price and the simulated gas doubled.
    async fn estimate_gas(&self, params: &CallParams) -> Result<GasQuote, LedgerError>;

    /// Signs and submits a creation transaction carrying
    /// `bytecode ‖ encoded_args`, then waits for its receipt.
    async fn deploy(
        &self,
        bytecode: &Bytes,
        encoded_args: &Bytes,
        signer: &Credentials,
    ) -> Result<Deployment, LedgerError>;

    /// Polls for a receipt under the configured policy.
    ///
    /// Stops early with `DeploymentFailed("receipt polling cancelled")` once
    /// `cancel` turns `true`.
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Whether live, non-destroyed code sits at `address`.
    async fn does_contract_exist(&self, address: &str) -> Result<bool, LedgerError>;

    /// Signs and submits a call to `name(args...)`; returns without waiting
    /// for inclusion.
    async fn invoke_function(
        &self,
        address: Address,
        name: &str,
        args: &[ConstructorArg],
        value: U256,
        signer: &Credentials,
    ) -> Result<TxHash, LedgerError>;

    /// Calls each zero-argument getter and decodes an address. Failures are
    /// reported per getter.
    async fn resolve_addresses(
        &self,
        address: Address,
        getters: &[String],
    ) -> BTreeMap<String, AddressResolution>;

    /// Balance in the smallest unit.
    async fn get_balance(&self, address: Address) -> Result<U256, LedgerError>;

    /// Receipt of a mined transaction, `None` while pending.
    async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, LedgerError>;

    /// Chain id reported by the node.
    async fn chain_id(&self) -> Result<u64, LedgerError>;
}
