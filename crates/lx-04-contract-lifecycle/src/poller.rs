//! # Confirmation Poller
//!
//! Periodically checks every DEPLOYED record against the ledger and moves
//! the ones whose code is live to CONFIRMED. Records without code are left
//! alone; a later pass or an explicit `verify_deployment` decides them.
//!
//! Passes never overlap: a tick that fires while the previous pass is still
//! running is skipped.

use crate::domain::Caller;
use crate::ports::{ContractLifecycleApi, RecordStore};
use crate::service::LifecycleService;
use lx_02_solc_adapter::SolidityCompiler;
use lx_03_ledger_client::LedgerApi;
use serde::Serialize;
use shared_types::ContractStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Poller configuration.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Time between passes.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollReport {
    /// DEPLOYED records examined.
    pub scanned: usize,
    /// Records moved to CONFIRMED.
    pub confirmed: usize,
    /// Records whose check or update failed.
    pub failed: usize,
}

/// Background confirmation of deployed contracts.
pub struct ConfirmationPoller<L: LedgerApi, C: SolidityCompiler, S: RecordStore> {
    config: PollerConfig,
    service: Arc<LifecycleService<L, C, S>>,
    running: AtomicBool,
}

/// Clears the single-flight flag however the pass ends.
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<L, C, S> ConfirmationPoller<L, C, S>
where
    L: LedgerApi,
    C: SolidityCompiler,
    S: RecordStore,
{
    /// Create a poller over the orchestrator.
    pub fn new(config: PollerConfig, service: Arc<LifecycleService<L, C, S>>) -> Self {
        Self {
            config,
            service,
            running: AtomicBool::new(false),
        }
    }

    /// Runs one pass. Returns `None` if another pass is in progress.
    pub async fn run_once(&self) -> Option<PollReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Confirmation pass already running, skipping");
            return None;
        }
        let _guard = PassGuard(&self.running);

        let records = match self.service.deployed_records().await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Could not list deployed contracts");
                return Some(PollReport::default());
            }
        };

        let mut report = PollReport {
            scanned: records.len(),
            ..PollReport::default()
        };
        for record in records {
            let Some(address) = record.deployed_address else {
                warn!(record_id = %record.id, "Deployed record has no address");
                report.failed += 1;
                continue;
            };

            match self
                .service
                .ledger()
                .does_contract_exist(&address.to_string())
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    debug!(record_id = %record.id, %address, "No live code yet");
                    continue;
                }
                Err(e) => {
                    warn!(record_id = %record.id, %address, error = %e, "Existence check failed");
                    report.failed += 1;
                    continue;
                }
            }

            match self
                .service
                .update_status_by_address(&Caller::System, address, ContractStatus::Confirmed)
                .await
            {
                Ok(_) => report.confirmed += 1,
                Err(e) => {
                    warn!(record_id = %record.id, %address, error = %e, "Confirmation not recorded");
                    report.failed += 1;
                }
            }
        }

        if report.scanned > 0 {
            info!(
                scanned = report.scanned,
                confirmed = report.confirmed,
                failed = report.failed,
                "Confirmation pass finished"
            );
        }
        Some(report)
    }

    /// Runs passes on the configured interval until `shutdown` turns `true`.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = self.config.interval.as_secs(), "Confirmation poller started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Confirmation poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRecordStore;
    use async_trait::async_trait;
    use lx_02_solc_adapter::{CompileError, CompiledArtifact};
    use lx_03_ledger_client::{LedgerClient, LedgerConfig, RpcError, ScriptedTransport};
    use serde_json::json;
    use shared_types::{Address, Bytes, ContractRecord};

    struct NoCompiler;

    #[async_trait]
    impl SolidityCompiler for NoCompiler {
        async fn compile(&self, _source: &str) -> Result<CompiledArtifact, CompileError> {
            Err(CompileError::CompilationFailed("not used".into()))
        }
    }

    type Poller = ConfirmationPoller<LedgerClient<ScriptedTransport>, NoCompiler, InMemoryRecordStore>;

    fn setup() -> (Arc<Poller>, Arc<ScriptedTransport>, Arc<InMemoryRecordStore>) {
        let node = Arc::new(ScriptedTransport::new());
        node.respond("eth_getCode", json!("0x"))
            .respond("eth_call", json!("0x"));
        let store = Arc::new(InMemoryRecordStore::new());
        let ledger = Arc::new(LedgerClient::new(LedgerConfig::default(), node.clone()));
        let service = Arc::new(LifecycleService::new(ledger, Arc::new(NoCompiler), store.clone()));
        let poller = Arc::new(ConfirmationPoller::new(PollerConfig::default(), service));
        (poller, node, store)
    }

    fn deployed(store: &InMemoryRecordStore, byte: u8) -> ContractRecord {
        let mut record = ContractRecord::uploaded("alice", "text");
        record.status = ContractStatus::Deployed;
        record.solidity_source = Some("contract A {}".into());
        record.binary = Some(Bytes::from(vec![0x60]));
        record.abi = Some("[]".into());
        record.deployed_address = Some(Address::new([byte; 20]));
        store.put(record.clone());
        record
    }

    fn code_at(node: &ScriptedTransport, byte: u8) {
        let needle = hex_address(byte);
        node.respond_when("eth_getCode", &needle, Ok(json!("0x6080")));
    }

    fn hex_address(byte: u8) -> String {
        format!("0x{}", format!("{byte:02x}").repeat(20))
    }

    #[tokio::test]
    async fn test_confirms_only_live_contracts() {
        let (poller, node, store) = setup();
        let live = deployed(&store, 0x11);
        let pending = deployed(&store, 0x22);
        code_at(&node, 0x11);

        let report = poller.run_once().await.unwrap();
        assert_eq!(
            report,
            PollReport {
                scanned: 2,
                confirmed: 1,
                failed: 0
            }
        );
        assert_eq!(store.get(&live.id).await.unwrap().unwrap().status, ContractStatus::Confirmed);
        assert_eq!(store.get(&pending.id).await.unwrap().unwrap().status, ContractStatus::Deployed);

        let again = poller.run_once().await.unwrap();
        assert_eq!(again.scanned, 1);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let (poller, node, store) = setup();
        let broken = deployed(&store, 0x33);
        let live = deployed(&store, 0x44);
        node.respond_when(
            "eth_getCode",
            &hex_address(0x33),
            Err(RpcError::Transport("connection refused".into())),
        );
        code_at(&node, 0x44);

        let report = poller.run_once().await.unwrap();
        assert_eq!(report.confirmed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(store.get(&broken.id).await.unwrap().unwrap().status, ContractStatus::Deployed);
        assert_eq!(store.get(&live.id).await.unwrap().unwrap().status, ContractStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_overlapping_pass_is_skipped() {
        let (poller, _node, _store) = setup();
        poller.running.store(true, Ordering::Release);
        assert_eq!(poller.run_once().await, None);

        poller.running.store(false, Ordering::Release);
        assert_eq!(poller.run_once().await, Some(PollReport::default()));
        assert!(!poller.running.load(Ordering::Acquire));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_until_shutdown() {
        let (poller, node, store) = setup();
        let record = deployed(&store, 0x55);
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(poller.clone().run(rx));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.get(&record.id).await.unwrap().unwrap().status, ContractStatus::Deployed);

        code_at(&node, 0x55);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.get(&record.id).await.unwrap().unwrap().status, ContractStatus::Confirmed);

        tx.send(true).unwrap();
        task.await.unwrap();
    }
}
