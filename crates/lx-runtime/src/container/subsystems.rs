//! # Subsystem Container
//!
//! Builds every subsystem once, in dependency order, and holds them for the
//! lifetime of the process.
//!
//! ```text
//! HttpRpcTransport ──→ LedgerClient ──┬──→ KeyVault (balances)
//!                                     └──→ LifecycleService ←── SolcCompiler
//!                                                 ↑
//!                                       InMemoryRecordStore
//! ```

use super::config::RuntimeConfig;
use lx_01_key_vault::{FsKeyDirectory, KeyVault};
use lx_02_solc_adapter::{SolcCompiler, TokioProcessRunner};
use lx_03_ledger_client::{HttpRpcTransport, LedgerClient};
use lx_04_contract_lifecycle::{ConfirmationPoller, InMemoryRecordStore, LifecycleService};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

/// Ledger client over HTTP.
pub type Ledger = LedgerClient<HttpRpcTransport>;
/// Key vault on the local filesystem, with balances from the ledger.
pub type Vault = KeyVault<FsKeyDirectory, Ledger>;
/// `solc` run as a child process.
pub type Compiler = SolcCompiler<TokioProcessRunner>;
/// Lifecycle orchestrator as wired in this process.
pub type Lifecycle = LifecycleService<Ledger, Compiler, InMemoryRecordStore>;
/// Confirmation poller as wired in this process.
pub type Poller = ConfirmationPoller<Ledger, Compiler, InMemoryRecordStore>;

/// Errors while building subsystems.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The ledger transport could not be created.
    #[error("ledger transport: {0}")]
    Transport(String),

    /// The keystore directory could not be opened.
    #[error("keystore {path}: {source}")]
    Keystore {
        /// Directory that failed.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}

/// All subsystems of a running process.
pub struct SubsystemContainer {
    /// Configuration the container was built from.
    pub config: RuntimeConfig,
    /// Ledger client.
    pub ledger: Arc<Ledger>,
    /// Key vault.
    pub vault: Arc<Vault>,
    /// Contract records.
    pub store: Arc<InMemoryRecordStore>,
    /// Lifecycle orchestrator.
    pub lifecycle: Arc<Lifecycle>,
}

impl SubsystemContainer {
    /// Build all subsystems.
    ///
    /// `shutdown` is handed to the ledger client so that receipt polling stops
    /// when the process does.
    pub async fn new(
        config: RuntimeConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self, ContainerError> {
        let transport =
            HttpRpcTransport::new(config.ledger.rpc_url.clone(), config.ledger.request_timeout)
                .map_err(|e| ContainerError::Transport(e.to_string()))?;
        let ledger = Arc::new(
            LedgerClient::new(config.ledger.clone(), Arc::new(transport)).with_shutdown(shutdown),
        );
        info!(rpc_url = %config.ledger.rpc_url, chain_id = config.ledger.chain_id, "Ledger client ready");

        let directory = FsKeyDirectory::open(config.vault.keystore_dir.clone())
            .await
            .map_err(|source| ContainerError::Keystore {
                path: config.vault.keystore_dir.display().to_string(),
                source,
            })?;
        let vault = Arc::new(KeyVault::new(
            config.vault.clone(),
            Arc::new(directory),
            ledger.clone(),
        ));
        info!(keystore = %config.vault.keystore_dir.display(), "Key vault ready");

        let compiler = Arc::new(SolcCompiler::new(
            config.solc.clone(),
            Arc::new(TokioProcessRunner),
        ));
        let store = Arc::new(InMemoryRecordStore::new());
        let lifecycle = Arc::new(LifecycleService::new(ledger.clone(), compiler, store.clone()));
        info!(solc = %config.solc.solc_path.display(), "Lifecycle orchestrator ready");

        Ok(Self {
            config,
            ledger,
            vault,
            store,
            lifecycle,
        })
    }

    /// A confirmation poller over this container's orchestrator.
    pub fn poller(&self) -> Arc<Poller> {
        Arc::new(ConfirmationPoller::new(
            self.config.poller,
            self.lifecycle.clone(),
        ))
    }
}
