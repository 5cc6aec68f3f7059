//! # Inbound Ports (Driving Ports)
//!
//! The lifecycle API exposed to the API layer. Every operation takes the
//! caller explicitly and checks existence, then ownership, before anything
//! else.

use crate::domain::{Caller, DeployedContract, DeploymentContext};
use crate::errors::LifecycleError;
use async_trait::async_trait;
use lx_01_key_vault::Credentials;
use lx_03_ledger_client::{AddressResolution, GasQuote};
use shared_types::{
    Address, ConstructorArg, ContractId, ContractRecord, ContractStatus, TxHash, U256,
};
use std::collections::BTreeMap;

/// Lifecycle Orchestrator API.
#[async_trait]
pub trait ContractLifecycleApi: Send + Sync {
    /// Creates a record at UPLOADED owned by the caller.
    async fn register_upload(
        &self,
        caller: &Caller,
        contract_text: &str,
    ) -> Result<ContractRecord, LifecycleError>;

    /// Stores the extracted clause list (→ CLAUSES_EXTRACTED).
    async fn record_clauses(
        &self,
        caller: &Caller,
        id: &ContractId,
        clauses: Vec<String>,
    ) -> Result<ContractRecord, LifecycleError>;

    /// Stores generated source and drops any stale artifact (→ SOLIDITY_PREPARED).
    async fn record_solidity(
        &self,
        caller: &Caller,
        id: &ContractId,
        source: String,
    ) -> Result<ContractRecord, LifecycleError>;

    /// Compiles the stored source (→ SOLIDITY_GENERATED).
    async fn compile(
        &self,
        caller: &Caller,
        id: &ContractId,
    ) -> Result<ContractRecord, LifecycleError>;

    /// Reads one owned record.
    async fn get_contract(
        &self,
        caller: &Caller,
        id: &ContractId,
    ) -> Result<ContractRecord, LifecycleError>;

    /// All records owned by the caller.
    async fn list_contracts(&self, caller: &Caller) -> Result<Vec<ContractRecord>, LifecycleError>;

    /// Bytecode plus encoded constructor arguments for an owned record.
    async fn prepare_deployment_context(
        &self,
        caller: &Caller,
        id: &ContractId,
        args: &[ConstructorArg],
    ) -> Result<DeploymentContext, LifecycleError>;

    /// Gas for deploying the record from `signer`. Read-only.
    async fn estimate_gas(
        &self,
        caller: &Caller,
        id: &ContractId,
        args: &[ConstructorArg],
        signer: Address,
    ) -> Result<GasQuote, LifecycleError>;

    /// Deploys and persists DEPLOYED with the new address. A ledger failure
    /// leaves the record untouched.
    async fn deploy(
        &self,
        caller: &Caller,
        id: &ContractId,
        args: &[ConstructorArg],
        signer: &Credentials,
    ) -> Result<DeployedContract, LifecycleError>;

    /// Moves the record deployed at `address` to `status`.
    async fn update_status_by_address(
        &self,
        caller: &Caller,
        address: Address,
        status: ContractStatus,
    ) -> Result<ContractRecord, LifecycleError>;

    /// Deletes a record that never reached DEPLOYED.
    async fn delete_if_not_deployed(
        &self,
        caller: &Caller,
        id: &ContractId,
    ) -> Result<(), LifecycleError>;

    /// Re-checks the ledger now: live code confirms, missing code terminates.
    async fn verify_deployment(
        &self,
        caller: &Caller,
        id: &ContractId,
    ) -> Result<ContractRecord, LifecycleError>;

    /// Calls a function of the deployed contract; returns the transaction hash.
    async fn invoke(
        &self,
        caller: &Caller,
        id: &ContractId,
        function: &str,
        args: &[ConstructorArg],
        value: U256,
        signer: &Credentials,
    ) -> Result<TxHash, LifecycleError>;

    /// Reads address-valued getters of the deployed contract.
    async fn resolve_addresses(
        &self,
        caller: &Caller,
        id: &ContractId,
        getters: &[String],
    ) -> Result<BTreeMap<String, AddressResolution>, LifecycleError>;
}
