//! # Lifecycle Service
//!
//! Owns the contract status state machine. Every operation reads the record,
//! checks existence and ownership, validates the transition, and only then
//! talks to the compiler or the ledger. Writes are compare-and-set on the
//! record read at the start, so a concurrent edit that keeps the status
//! still fails the slower writer with `StatusConflict`.
//!
//! ## Transitions
//!
//! | Operation | From | To |
//! |-----------|------|----|
//! | `record_clauses` | UPLOADED, CLAUSES_EXTRACTED | CLAUSES_EXTRACTED |
//! | `record_solidity` | CLAUSES_EXTRACTED ..= SOLIDITY_GENERATED | SOLIDITY_PREPARED |
//! | `compile` | SOLIDITY_PREPARED, SOLIDITY_GENERATED | SOLIDITY_GENERATED |
//! | `deploy` | SOLIDITY_GENERATED | DEPLOYED |
//! | `verify_deployment` | DEPLOYED, CONFIRMED | CONFIRMED / TERMINATED |
//! | `update_status_by_address` | any | per `ContractStatus::can_transition_to` |
//!
//! Storing new source on a compiled record drops its artifact and moves it
//! back to SOLIDITY_PREPARED. Nothing moves a record backwards once it is
//! deployed.

use crate::domain::rules::{
    authorize_owner, authorize_status_update, ensure_live, ensure_not_deployed, ensure_transition,
};
use crate::domain::{
    ArtifactChange, Caller, DeployedContract, DeploymentContext, RecordFilter, RecordPatch,
};
use crate::errors::LifecycleError;
use crate::ports::{ContractLifecycleApi, RecordStore};
use async_trait::async_trait;
use lx_01_key_vault::Credentials;
use lx_02_solc_adapter::SolidityCompiler;
use lx_03_ledger_client::{AddressResolution, CallParams, GasQuote, LedgerApi};
use shared_types::{
    Address, ConstructorArg, ContractId, ContractRecord, ContractStatus, TxHash, U256,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Lifecycle statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleStats {
    /// Successful compilations.
    pub compilations: u64,
    /// Successful deployments.
    pub deployments: u64,
    /// Status changes written after a ledger check.
    pub status_updates: u64,
}

#[derive(Default)]
struct StatCounters {
    compilations: AtomicU64,
    deployments: AtomicU64,
    status_updates: AtomicU64,
}

/// The Lifecycle Orchestrator.
pub struct LifecycleService<L: LedgerApi, C: SolidityCompiler, S: RecordStore> {
    ledger: Arc<L>,
    compiler: Arc<C>,
    store: Arc<S>,
    stats: StatCounters,
}

impl<L: LedgerApi, C: SolidityCompiler, S: RecordStore> LifecycleService<L, C, S> {
    /// Create an orchestrator over its three collaborators.
    pub fn new(ledger: Arc<L>, compiler: Arc<C>, store: Arc<S>) -> Self {
        Self {
            ledger,
            compiler,
            store,
            stats: StatCounters::default(),
        }
    }

    /// The ledger client in use.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Get current lifecycle statistics.
    pub fn stats(&self) -> LifecycleStats {
        LifecycleStats {
            compilations: self.stats.compilations.load(Ordering::Relaxed),
            deployments: self.stats.deployments.load(Ordering::Relaxed),
            status_updates: self.stats.status_updates.load(Ordering::Relaxed),
        }
    }

    /// Records waiting for confirmation. Used by the poller.
    pub async fn deployed_records(&self) -> Result<Vec<ContractRecord>, LifecycleError> {
        Ok(self
            .store
            .query(&RecordFilter::Status(ContractStatus::Deployed))
            .await?)
    }

    async fn load(&self, id: &ContractId) -> Result<ContractRecord, LifecycleError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| LifecycleError::RecordNotFound(id.to_string()))
    }

    async fn load_owned(
        &self,
        caller: &Caller,
        id: &ContractId,
    ) -> Result<ContractRecord, LifecycleError> {
        let record = self.load(id).await?;
        authorize_owner(caller, &record)?;
        Ok(record)
    }

    /// Compare-and-set write against `record` as it was read.
    async fn write(
        &self,
        record: &ContractRecord,
        patch: RecordPatch,
    ) -> Result<ContractRecord, LifecycleError> {
        Ok(self.store.update(record, patch).await?)
    }

    async fn set_status(
        &self,
        record: ContractRecord,
        status: ContractStatus,
    ) -> Result<ContractRecord, LifecycleError> {
        if record.status == status {
            return Ok(record);
        }
        ensure_transition(record.status, status)?;
        let updated = self.write(&record, RecordPatch::status(status)).await?;
        self.stats.status_updates.fetch_add(1, Ordering::Relaxed);
        info!(record_id = %record.id, from = %record.status, to = %status, "Status updated");
        Ok(updated)
    }

    async fn prepare(
        &self,
        caller: &Caller,
        id: &ContractId,
        args: &[ConstructorArg],
    ) -> Result<(ContractRecord, DeploymentContext), LifecycleError> {
        let record = self.load_owned(caller, id).await?;
        let bytecode = record
            .bytecode()
            .cloned()
            .ok_or_else(|| LifecycleError::InvalidArtifact(format!("contract {id} has no bytecode")))?;
        let encoded_args = self.ledger.build_deployment_context(&bytecode, args)?;

        let context = DeploymentContext {
            record_id: record.id,
            bytecode,
            encoded_args,
        };
        Ok((record, context))
    }

    fn live_address(record: &ContractRecord) -> Result<Address, LifecycleError> {
        ensure_live(record)?;
        record.deployed_address.ok_or_else(|| {
            LifecycleError::InvalidArtifact(format!("contract {} has no deployed address", record.id))
        })
    }
}

#[async_trait]
impl<L, C, S> ContractLifecycleApi for LifecycleService<L, C, S>
where
    L: LedgerApi,
    C: SolidityCompiler,
    S: RecordStore,
{
    #[instrument(skip(self, contract_text), fields(%caller, text_len = contract_text.len()))]
    async fn register_upload(
        &self,
        caller: &Caller,
        contract_text: &str,
    ) -> Result<ContractRecord, LifecycleError> {
        let user_id = caller
            .user_id()
            .ok_or_else(|| LifecycleError::Unauthorized(format!("{caller} cannot upload")))?;
        if contract_text.trim().is_empty() {
            return Err(LifecycleError::InvalidArtifact("contract text is empty".into()));
        }

        let record = ContractRecord::uploaded(user_id, contract_text);
        self.store.insert(record.clone()).await?;
        info!(record_id = %record.id, "Contract uploaded");
        Ok(record)
    }

    #[instrument(skip(self, clauses), fields(%caller, clauses = clauses.len()))]
    async fn record_clauses(
        &self,
        caller: &Caller,
        id: &ContractId,
        clauses: Vec<String>,
    ) -> Result<ContractRecord, LifecycleError> {
        let record = self.load_owned(caller, id).await?;
        ensure_not_deployed(&record)?;
        if record.status > ContractStatus::ClausesExtracted {
            return Err(LifecycleError::InvalidStatusTransition {
                from: record.status,
                to: ContractStatus::ClausesExtracted,
            });
        }

        let patch = RecordPatch {
            status: Some(ContractStatus::ClausesExtracted),
            extracted_clauses: Some(clauses),
            ..RecordPatch::default()
        };
        self.write(&record, patch).await
    }

    #[instrument(skip(self, source), fields(%caller, source_len = source.len()))]
    async fn record_solidity(
        &self,
        caller: &Caller,
        id: &ContractId,
        source: String,
    ) -> Result<ContractRecord, LifecycleError> {
        let record = self.load_owned(caller, id).await?;
        ensure_not_deployed(&record)?;
        if record.status < ContractStatus::ClausesExtracted {
            return Err(LifecycleError::InvalidStatusTransition {
                from: record.status,
                to: ContractStatus::SolidityPrepared,
            });
        }

        let patch = RecordPatch {
            status: Some(ContractStatus::SolidityPrepared),
            solidity_source: Some(source),
            artifact: record.binary.is_some().then_some(ArtifactChange::Clear),
            ..RecordPatch::default()
        };
        self.write(&record, patch).await
    }

    #[instrument(skip(self), fields(%caller))]
    async fn compile(
        &self,
        caller: &Caller,
        id: &ContractId,
    ) -> Result<ContractRecord, LifecycleError> {
        let record = self.load_owned(caller, id).await?;
        ensure_not_deployed(&record)?;
        if record.status < ContractStatus::SolidityPrepared {
            return Err(LifecycleError::InvalidStatusTransition {
                from: record.status,
                to: ContractStatus::SolidityGenerated,
            });
        }
        let source = record
            .solidity_source
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| LifecycleError::InvalidArtifact(format!("contract {id} has no source")))?;

        let artifact = self.compiler.compile(source).await.map_err(|e| {
            warn!(record_id = %id, error = %e, "Compilation failed");
            e
        })?;

        let patch = RecordPatch {
            status: Some(ContractStatus::SolidityGenerated),
            artifact: Some(ArtifactChange::Set {
                binary: artifact.bytecode,
                abi: artifact.abi,
            }),
            ..RecordPatch::default()
        };
        let updated = self.write(&record, patch).await?;
        self.stats.compilations.fetch_add(1, Ordering::Relaxed);
        info!(record_id = %id, contract = %artifact.contract_name, "Contract compiled");
        Ok(updated)
    }

    async fn get_contract(
        &self,
        caller: &Caller,
        id: &ContractId,
    ) -> Result<ContractRecord, LifecycleError> {
        self.load_owned(caller, id).await
    }

    async fn list_contracts(&self, caller: &Caller) -> Result<Vec<ContractRecord>, LifecycleError> {
        let user_id = caller
            .user_id()
            .ok_or_else(|| LifecycleError::Unauthorized(format!("{caller} has no contracts")))?;
        let mut records = self
            .store
            .query(&RecordFilter::Owner(user_id.to_string()))
            .await?;
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn prepare_deployment_context(
        &self,
        caller: &Caller,
        id: &ContractId,
        args: &[ConstructorArg],
    ) -> Result<DeploymentContext, LifecycleError> {
        self.prepare(caller, id, args).await.map(|(_, context)| context)
    }

    #[instrument(skip(self, args), fields(%caller))]
    async fn estimate_gas(
        &self,
        caller: &Caller,
        id: &ContractId,
        args: &[ConstructorArg],
        signer: Address,
    ) -> Result<GasQuote, LifecycleError> {
        let (_, context) = self.prepare(caller, id, args).await?;
        let params = CallParams {
            from: Some(signer),
            data: context.creation_data(),
            ..CallParams::default()
        };
        Ok(self.ledger.estimate_gas(&params).await?)
    }

    #[instrument(skip(self, args, signer), fields(%caller, signer = %signer.address()))]
    async fn deploy(
        &self,
        caller: &Caller,
        id: &ContractId,
        args: &[ConstructorArg],
        signer: &Credentials,
    ) -> Result<DeployedContract, LifecycleError> {
        let (record, context) = self.prepare(caller, id, args).await?;
        ensure_not_deployed(&record)?;
        ensure_transition(record.status, ContractStatus::Deployed)?;

        let deployment = self
            .ledger
            .deploy(&context.bytecode, &context.encoded_args, signer)
            .await
            .map_err(|e| {
                warn!(record_id = %id, error = %e, "Deployment failed, record unchanged");
                e
            })?;

        let patch = RecordPatch {
            status: Some(ContractStatus::Deployed),
            deployed_address: Some(deployment.address),
            ..RecordPatch::default()
        };
        let updated = self.write(&record, patch).await.map_err(|e| {
            error!(
                record_id = %id,
                address = %deployment.address,
                tx_hash = %deployment.tx_hash,
                error = %e,
                "Contract is on the ledger but the record was not updated"
            );
            e
        })?;

        self.stats.deployments.fetch_add(1, Ordering::Relaxed);
        info!(record_id = %id, address = %deployment.address, tx_hash = %deployment.tx_hash, "Contract deployed");
        Ok(DeployedContract {
            record: updated,
            deployment,
        })
    }

    #[instrument(skip(self), fields(%caller))]
    async fn update_status_by_address(
        &self,
        caller: &Caller,
        address: Address,
        status: ContractStatus,
    ) -> Result<ContractRecord, LifecycleError> {
        let mut matches = self
            .store
            .query(&RecordFilter::DeployedAddress(address))
            .await?;
        if matches.len() > 1 {
            warn!(%address, count = matches.len(), "Several records share a deployed address");
        }
        let record = matches
            .pop()
            .ok_or_else(|| LifecycleError::RecordNotFound(format!("no contract at {address}")))?;
        authorize_status_update(caller, &record)?;
        self.set_status(record, status).await
    }

    #[instrument(skip(self), fields(%caller))]
    async fn delete_if_not_deployed(
        &self,
        caller: &Caller,
        id: &ContractId,
    ) -> Result<(), LifecycleError> {
        let record = self.load_owned(caller, id).await?;
        ensure_not_deployed(&record)?;
        self.store.delete(&record).await?;
        info!(record_id = %id, "Contract deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(%caller))]
    async fn verify_deployment(
        &self,
        caller: &Caller,
        id: &ContractId,
    ) -> Result<ContractRecord, LifecycleError> {
        let record = self.load_owned(caller, id).await?;
        if record.status == ContractStatus::Terminated {
            debug!(record_id = %id, "Terminated contracts are not re-checked");
            return Ok(record);
        }
        let address = Self::live_address(&record)?;

        let exists = self.ledger.does_contract_exist(&address.to_string()).await?;
        let target = if exists {
            ContractStatus::Confirmed
        } else {
            ContractStatus::Terminated
        };
        self.set_status(record, target).await
    }

    #[instrument(skip(self, args, signer), fields(%caller))]
    async fn invoke(
        &self,
        caller: &Caller,
        id: &ContractId,
        function: &str,
        args: &[ConstructorArg],
        value: U256,
        signer: &Credentials,
    ) -> Result<TxHash, LifecycleError> {
        let record = self.load_owned(caller, id).await?;
        let address = Self::live_address(&record)?;
        Ok(self
            .ledger
            .invoke_function(address, function, args, value, signer)
            .await?)
    }

    async fn resolve_addresses(
        &self,
        caller: &Caller,
        id: &ContractId,
        getters: &[String],
    ) -> Result<BTreeMap<String, AddressResolution>, LifecycleError> {
        let record = self.load_owned(caller, id).await?;
        let address = Self::live_address(&record)?;
        Ok(self.ledger.resolve_addresses(address, getters).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRecordStore;
    use lx_02_solc_adapter::{CompileError, CompiledArtifact};
    use lx_03_ledger_client::{LedgerClient, LedgerConfig, RpcError, ScriptedTransport};
    use serde_json::json;
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{Bytes, ErrorKind};
    use std::time::Duration;
    use tokio::sync::Notify;

    const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

    struct FixedCompiler(Result<CompiledArtifact, CompileError>);

    #[async_trait]
    impl SolidityCompiler for FixedCompiler {
        async fn compile(&self, _source: &str) -> Result<CompiledArtifact, CompileError> {
            self.0.clone()
        }
    }

    /// Holds every compile until the test opens the gate.
    #[derive(Default)]
    struct GatedCompiler {
        entered: Notify,
        gate: Notify,
    }

    #[async_trait]
    impl SolidityCompiler for GatedCompiler {
        async fn compile(&self, _source: &str) -> Result<CompiledArtifact, CompileError> {
            self.entered.notify_one();
            self.gate.notified().await;
            Ok(artifact())
        }
    }

    type Service<C> = LifecycleService<LedgerClient<ScriptedTransport>, C, InMemoryRecordStore>;

    struct Harness<C: SolidityCompiler = FixedCompiler> {
        service: Arc<Service<C>>,
        compiler: Arc<C>,
        node: Arc<ScriptedTransport>,
        store: Arc<InMemoryRecordStore>,
    }

    fn artifact() -> CompiledArtifact {
        CompiledArtifact {
            contract_name: "Lease".into(),
            bytecode: Bytes::from_hex("600160").unwrap(),
            abi: "[]".into(),
        }
    }

    fn harness_with<C: SolidityCompiler>(compiler: C) -> Harness<C> {
        let node = Arc::new(ScriptedTransport::new());
        node.respond("eth_gasPrice", json!("0x1"))
            .respond("eth_estimateGas", json!("0x5208"))
            .respond("eth_getTransactionCount", json!("0x0"))
            .respond("eth_sendRawTransaction", json!(format!("0x{}", "ab".repeat(32))))
            .respond(
                "eth_getTransactionReceipt",
                json!({
                    "transactionHash": format!("0x{}", "ab".repeat(32)),
                    "contractAddress": CONTRACT,
                    "status": "0x1"
                }),
            )
            .respond("eth_getCode", json!("0x6080"))
            .respond("eth_call", json!("0x"));
        let store = Arc::new(InMemoryRecordStore::new());
        let ledger = Arc::new(LedgerClient::new(LedgerConfig::default(), node.clone()));
        let compiler = Arc::new(compiler);
        let service = LifecycleService::new(ledger, compiler.clone(), store.clone());
        Harness {
            service: Arc::new(service),
            compiler,
            node,
            store,
        }
    }

    fn harness() -> Harness {
        harness_with(FixedCompiler(Ok(artifact())))
    }

    fn alice() -> Caller {
        Caller::User("alice".into())
    }

    fn signer() -> Credentials {
        Credentials::from_key_pair(Secp256k1KeyPair::from_bytes([5u8; 32]).unwrap())
    }

    fn seeded<C: SolidityCompiler>(h: &Harness<C>, status: ContractStatus) -> ContractRecord {
        let mut record = ContractRecord::uploaded("alice", "The lessee shall pay rent monthly.");
        record.status = status;
        if status >= ContractStatus::SolidityPrepared {
            record.solidity_source = Some("contract Lease {}".into());
        }
        if status >= ContractStatus::SolidityGenerated {
            record.binary = Some(Bytes::from_hex("600160").unwrap());
            record.abi = Some("[]".into());
        }
        if status.is_deployed() {
            record.deployed_address = Some(CONTRACT.parse().unwrap());
        }
        h.store.put(record.clone());
        record
    }

    async fn stored<C: SolidityCompiler>(h: &Harness<C>, id: &ContractId) -> ContractRecord {
        h.store.get(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_upload_to_compiled() {
        let h = harness();
        let record = h
            .service
            .register_upload(&alice(), "The lessee shall pay rent monthly.")
            .await
            .unwrap();
        assert_eq!(record.status, ContractStatus::Uploaded);

        h.service
            .record_clauses(&alice(), &record.id, vec!["Rent is due monthly".into()])
            .await
            .unwrap();
        h.service
            .record_solidity(&alice(), &record.id, "contract Lease {}".into())
            .await
            .unwrap();
        let compiled = h.service.compile(&alice(), &record.id).await.unwrap();

        assert_eq!(compiled.status, ContractStatus::SolidityGenerated);
        assert_eq!(compiled.binary, Some(Bytes::from_hex("600160").unwrap()));
        assert_eq!(compiled.abi.as_deref(), Some("[]"));
        assert_eq!(h.service.stats().compilations, 1);
    }

    #[tokio::test]
    async fn test_anonymous_cannot_upload() {
        let h = harness();
        let err = h
            .service
            .register_upload(&Caller::Anonymous, "text")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_compilation_failure_keeps_record_and_diagnostics() {
        let diag = "Error: Expected ';' but got '}'";
        let h = harness_with(FixedCompiler(Err(CompileError::CompilationFailed(diag.into()))));
        let record = seeded(&h, ContractStatus::SolidityPrepared);

        let err = h.service.compile(&alice(), &record.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CompilationFailed);
        assert!(err.to_string().contains(diag));
        assert_eq!(stored(&h, &record.id).await, record);
    }

    #[tokio::test]
    async fn test_new_source_drops_stale_artifact() {
        let h = harness();
        let record = seeded(&h, ContractStatus::SolidityGenerated);

        let updated = h
            .service
            .record_solidity(&alice(), &record.id, "contract LeaseV2 {}".into())
            .await
            .unwrap();
        assert_eq!(updated.status, ContractStatus::SolidityPrepared);
        assert!(updated.binary.is_none() && updated.abi.is_none());

        let err = h
            .service
            .prepare_deployment_context(&alice(), &record.id, &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArtifact);
    }

    #[tokio::test]
    async fn test_missing_record_fails_everywhere() {
        let h = harness();
        let id = ContractId::new();
        let caller = alice();

        let results: Vec<LifecycleError> = vec![
            h.service.get_contract(&caller, &id).await.unwrap_err(),
            h.service.compile(&caller, &id).await.unwrap_err(),
            h.service
                .prepare_deployment_context(&caller, &id, &[])
                .await
                .unwrap_err(),
            h.service
                .estimate_gas(&caller, &id, &[], Address::ZERO)
                .await
                .unwrap_err(),
            h.service.deploy(&caller, &id, &[], &signer()).await.unwrap_err(),
            h.service.delete_if_not_deployed(&caller, &id).await.unwrap_err(),
            h.service.verify_deployment(&caller, &id).await.unwrap_err(),
        ];
        for err in results {
            assert_eq!(err.kind(), ErrorKind::RecordNotFound, "{err}");
        }
        assert!(h.node.calls().is_empty());
    }

    #[tokio::test]
    async fn test_other_users_are_refused_before_any_side_effect() {
        let h = harness();
        let record = seeded(&h, ContractStatus::SolidityGenerated);
        let bob = Caller::User("bob".into());

        let err = h.service.deploy(&bob, &record.id, &[], &signer()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let err = h.service.delete_if_not_deployed(&bob, &record.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        assert!(h.node.calls().is_empty());
        assert_eq!(stored(&h, &record.id).await, record);
    }

    #[tokio::test]
    async fn test_deploy_persists_address() {
        let h = harness();
        let record = seeded(&h, ContractStatus::SolidityGenerated);
        let owner: Address = "0xAbC000000000000000000000000000000000dEaD".parse().unwrap();
        let args = vec![ConstructorArg::Address(owner), ConstructorArg::Uint(U256::from(100))];

        let deployed = h
            .service
            .deploy(&alice(), &record.id, &args, &signer())
            .await
            .unwrap();

        assert_eq!(deployed.record.status, ContractStatus::Deployed);
        assert_eq!(deployed.record.deployed_address, Some(CONTRACT.parse().unwrap()));
        assert_eq!(stored(&h, &record.id).await, deployed.record);
        assert_eq!(h.service.stats().deployments, 1);
    }

    #[tokio::test]
    async fn test_failed_submission_leaves_status() {
        let h = harness();
        h.node.fail(
            "eth_sendRawTransaction",
            RpcError::Rpc {
                code: -32000,
                message: "nonce too low".into(),
                data: None,
            },
        );
        let record = seeded(&h, ContractStatus::SolidityGenerated);

        let err = h
            .service
            .deploy(&alice(), &record.id, &[], &signer())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeploymentFailed);
        assert!(err.to_string().contains("nonce too low"));
        assert_eq!(stored(&h, &record.id).await, record);
    }

    #[tokio::test]
    async fn test_compile_loses_to_concurrent_source_edit() {
        let h = harness_with(GatedCompiler::default());
        let record = seeded(&h, ContractStatus::SolidityPrepared);

        let service = h.service.clone();
        let id = record.id;
        let compiling = tokio::spawn(async move { service.compile(&alice(), &id).await });
        h.compiler.entered.notified().await;

        // same status, different source
        h.service
            .record_solidity(&alice(), &record.id, "contract B {}".into())
            .await
            .unwrap();
        h.compiler.gate.notify_one();

        let err = compiling.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StatusConflict);
        let current = stored(&h, &record.id).await;
        assert_eq!(current.solidity_source.as_deref(), Some("contract B {}"));
        assert_eq!(current.status, ContractStatus::SolidityPrepared);
        assert_eq!(current.binary, None);
        assert_eq!(h.service.stats().compilations, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deploy_loses_to_edit_during_receipt_wait() {
        let h = harness();
        h.node.push("eth_getTransactionReceipt", Ok(json!(null)));
        let record = seeded(&h, ContractStatus::SolidityGenerated);

        let service = h.service.clone();
        let id = record.id;
        let deploying =
            tokio::spawn(async move { service.deploy(&alice(), &id, &[], &signer()).await });
        tokio::time::sleep(Duration::from_millis(100)).await;

        h.service
            .record_solidity(&alice(), &record.id, "contract LeaseV2 {}".into())
            .await
            .unwrap();

        let err = deploying.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StatusConflict);
        let current = stored(&h, &record.id).await;
        assert_eq!(current.status, ContractStatus::SolidityPrepared);
        assert_eq!(current.deployed_address, None);
        assert_eq!(current.solidity_source.as_deref(), Some("contract LeaseV2 {}"));
        assert_eq!(h.service.stats().deployments, 0);
    }

    #[tokio::test]
    async fn test_redeploy_is_refused() {
        let h = harness();
        let record = seeded(&h, ContractStatus::Deployed);

        let err = h
            .service
            .deploy(&alice(), &record.id, &[], &signer())
            .await
            .unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyConfirmed(ContractStatus::Deployed));
        assert_eq!(h.node.calls_to("eth_sendRawTransaction"), 0);
    }

    #[tokio::test]
    async fn test_estimate_is_read_only() {
        let h = harness();
        let record = seeded(&h, ContractStatus::SolidityGenerated);

        let quote = h
            .service
            .estimate_gas(&alice(), &record.id, &[ConstructorArg::from(7u64)], Address::new([1; 20]))
            .await
            .unwrap();
        assert_eq!(quote.gas_limit, U256::from(42_000u64));
        assert_eq!(stored(&h, &record.id).await, record);
        assert_eq!(h.node.calls_to("eth_sendRawTransaction"), 0);
    }

    #[tokio::test]
    async fn test_update_status_by_address() {
        let h = harness();
        let record = seeded(&h, ContractStatus::Deployed);
        let address: Address = CONTRACT.parse().unwrap();

        let confirmed = h
            .service
            .update_status_by_address(&Caller::System, address, ContractStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, ContractStatus::Confirmed);

        let err = h
            .service
            .update_status_by_address(&Caller::Anonymous, address, ContractStatus::Terminated)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = h
            .service
            .update_status_by_address(&Caller::System, Address::new([3; 20]), ContractStatus::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecordNotFound);
        assert_eq!(stored(&h, &record.id).await.status, ContractStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_terminated_is_never_confirmed_again() {
        let h = harness();
        seeded(&h, ContractStatus::Terminated);

        let err = h
            .service
            .update_status_by_address(
                &Caller::System,
                CONTRACT.parse().unwrap(),
                ContractStatus::Confirmed,
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidStatusTransition {
                from: ContractStatus::Terminated,
                to: ContractStatus::Confirmed,
            }
        );
    }

    #[tokio::test]
    async fn test_delete_if_not_deployed() {
        let h = harness();
        let deployed = seeded(&h, ContractStatus::Deployed);
        let err = h
            .service
            .delete_if_not_deployed(&alice(), &deployed.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyConfirmed);
        assert!(h.store.get(&deployed.id).await.unwrap().is_some());

        let draft = seeded(&h, ContractStatus::SolidityGenerated);
        h.service.delete_if_not_deployed(&alice(), &draft.id).await.unwrap();
        assert!(h.store.get(&draft.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_deployment_confirms_then_terminates() {
        let h = harness();
        let record = seeded(&h, ContractStatus::Deployed);

        let confirmed = h.service.verify_deployment(&alice(), &record.id).await.unwrap();
        assert_eq!(confirmed.status, ContractStatus::Confirmed);

        h.node.respond("eth_getCode", json!("0x"));
        let terminated = h.service.verify_deployment(&alice(), &record.id).await.unwrap();
        assert_eq!(terminated.status, ContractStatus::Terminated);

        h.node.respond("eth_getCode", json!("0x6080"));
        let still = h.service.verify_deployment(&alice(), &record.id).await.unwrap();
        assert_eq!(still.status, ContractStatus::Terminated);
    }

    #[tokio::test]
    async fn test_verify_requires_deployment() {
        let h = harness();
        let record = seeded(&h, ContractStatus::SolidityGenerated);
        let err = h.service.verify_deployment(&alice(), &record.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatusTransition);
        assert_eq!(h.node.calls_to("eth_getCode"), 0);
    }

    #[tokio::test]
    async fn test_invoke_and_resolve_on_live_contract() {
        let h = harness();
        let record = seeded(&h, ContractStatus::Confirmed);

        let hash = h
            .service
            .invoke(&alice(), &record.id, "payRent", &[], U256::from(10), &signer())
            .await
            .unwrap();
        assert_eq!(hash.to_string(), format!("0x{}", "ab".repeat(32)));

        h.node.respond(
            "eth_call",
            json!(format!("0x{}{}", "0".repeat(24), "22".repeat(20))),
        );
        let resolved = h
            .service
            .resolve_addresses(&alice(), &record.id, &["tenant".to_string()])
            .await
            .unwrap();
        assert_eq!(
            resolved["tenant"],
            AddressResolution::Resolved(Address::new([0x22; 20]))
        );
    }

    #[tokio::test]
    async fn test_invoke_requires_live_contract() {
        let h = harness();
        let record = seeded(&h, ContractStatus::SolidityGenerated);
        let err = h
            .service
            .invoke(&alice(), &record.id, "payRent", &[], U256::zero(), &signer())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatusTransition);
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped() {
        let h = harness();
        seeded(&h, ContractStatus::Uploaded);
        seeded(&h, ContractStatus::Deployed);
        h.service
            .register_upload(&Caller::User("bob".into()), "Bob's lease")
            .await
            .unwrap();

        assert_eq!(h.service.list_contracts(&alice()).await.unwrap().len(), 2);
        assert!(h.service.list_contracts(&Caller::Anonymous).await.is_err());
    }

    #[tokio::test]
    async fn test_clauses_cannot_rewind_generated_contract() {
        let h = harness();
        let record = seeded(&h, ContractStatus::SolidityGenerated);
        let err = h
            .service
            .record_clauses(&alice(), &record.id, vec![])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatusTransition);
    }
}
