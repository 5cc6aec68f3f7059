//! # LexChain Runtime
//!
//! Process entry point for the contract lifecycle service.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and subsystem construction
//! - `logging` - Subscriber setup
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `LX_*` environment variables
//! 2. Refuse an empty keystore passphrase or a zero chain id
//! 3. Build subsystems (ledger client → key vault → compiler → orchestrator)
//! 4. Compare the configured chain id with the node's
//! 5. Spawn the confirmation poller
//! 6. Run until Ctrl-C, then signal shutdown to the poller and to any
//!    receipt polling in flight

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod container;
pub mod logging;

use crate::container::{RuntimeConfig, SubsystemContainer};
use anyhow::{Context, Result};
use lx_01_key_vault::KeyVaultApi;
use lx_03_ledger_client::LedgerApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The running process.
pub struct LexRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    poller_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl LexRuntime {
    /// Validate `config` and build every subsystem.
    pub async fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let container = SubsystemContainer::new(config, shutdown_rx.clone())
            .await
            .context("failed to build subsystems")?;

        Ok(Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            poller_task: parking_lot::Mutex::new(None),
        })
    }

    /// Check the node and start background tasks.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  LexChain Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        self.check_chain_id().await;

        match self.container.vault.list_wallets().await {
            Ok(wallets) => info!(wallets = wallets.len(), "Keystore scanned"),
            Err(e) => warn!(error = %e, "Keystore scan failed"),
        }

        let poller = self.container.poller();
        let handle = tokio::spawn(poller.run(self.shutdown_rx.clone()));
        *self.poller_task.lock() = Some(handle);

        info!(
            poll_interval_secs = self.container.config.poller.interval.as_secs(),
            "Runtime started"
        );
        Ok(())
    }

    /// A mismatch is logged, not fatal: the node may simply be unreachable yet.
    async fn check_chain_id(&self) {
        let configured = self.container.config.ledger.chain_id;
        match self.container.ledger.chain_id().await {
            Ok(reported) if reported == configured => {
                info!(chain_id = reported, "Connected to ledger node");
            }
            Ok(reported) => warn!(
                configured,
                reported,
                "Node reports a different chain id; transactions will be rejected"
            ),
            Err(e) => warn!(error = %e, "Ledger node not reachable at startup"),
        }
    }

    /// Signal shutdown and wait for the poller to stop.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let handle = self.poller_task.lock().take();
        if let Some(handle) = handle {
            match tokio::time::timeout(Duration::from_secs(5), handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "Poller task failed"),
                Err(_) => warn!("Poller did not stop in time"),
            }
        }

        info!("Shutdown complete");
    }

    /// The subsystem container.
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}
