//! Ecosystem coordinator — the single background worker that drains the
//! migration and broadcast queues and runs periodic health checks.
//!
//! The coordinator is constructed explicitly and handed to everything
//! that needs it; there is no process-wide instance. One coarse
//! `tokio::sync::Mutex` guards the whole `EcosystemState` — mutation
//! frequency (stat reports, occasional migrations) is low relative to
//! reads, so a single lock keeps the invariants simple.
//!
//! Producers never block: the migration and broadcast queues are
//! unbounded channels with the worker as sole consumer, so dequeue order
//! is FIFO. Quarantine is a per-packet suspension on its own task, never
//! a hold on the shared lock, so completion order may differ from
//! enqueue order.

use crate::analyzer::{self, EcosystemHealthReport, EcosystemStatus};
use crate::config::EcosystemConfig;
use crate::gene_transfer::{self, GeneTransfer};
use crate::pipeline::{self, MigrationPacket, MigrationRecord, MigrationStatus};
use crate::registry::ColonyInfo;
use crate::session;
use crate::state::EcosystemState;
use plasmid_core::agent::{ColonyHost, MigratableAgent};
use plasmid_core::error::Result;
use plasmid_core::types::{now_ms, ColonyId, KnowledgeItem, TransferId};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Notice that a pending gene transfer awaits application in a colony.
#[derive(Debug, Clone)]
struct BroadcastNotice {
    transfer_id: TransferId,
    target_colony: ColonyId,
}

type QueueReceivers = (
    mpsc::UnboundedReceiver<MigrationPacket>,
    mpsc::UnboundedReceiver<BroadcastNotice>,
);

/// Coordinates colonies, migrations, and gene transfers for one
/// ecosystem.
pub struct EcosystemCoordinator {
    state: Arc<Mutex<EcosystemState>>,
    host: Arc<dyn ColonyHost>,
    config: EcosystemConfig,
    migration_tx: mpsc::UnboundedSender<MigrationPacket>,
    broadcast_tx: mpsc::UnboundedSender<BroadcastNotice>,
    /// Receivers handed to the worker on first start.
    queues: Mutex<Option<QueueReceivers>>,
    shutdown_tx: watch::Sender<bool>,
    running: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
    store_path: Option<PathBuf>,
    /// Seeds the gene-expression jitter.
    transfer_seq: AtomicU64,
}

impl EcosystemCoordinator {
    /// Create a coordinator with no persistence.
    pub fn new(
        ecosystem_name: impl Into<String>,
        host: Arc<dyn ColonyHost>,
        config: EcosystemConfig,
    ) -> Self {
        Self::with_store(ecosystem_name, host, config, None)
    }

    /// Create a coordinator backed by a snapshot file. An existing
    /// snapshot is restored; a missing or unreadable one just means an
    /// empty start.
    pub fn with_store(
        ecosystem_name: impl Into<String>,
        host: Arc<dyn ColonyHost>,
        config: EcosystemConfig,
        store_path: Option<PathBuf>,
    ) -> Self {
        let ecosystem_name = ecosystem_name.into();
        let mut state = EcosystemState::new(&ecosystem_name, config.knowledge_capacity);

        if let Some(path) = &store_path {
            match session::load_ecosystem(path) {
                Ok(snapshot) => {
                    session::restore_into_state(&mut state, &snapshot);
                    info!(
                        ecosystem = %ecosystem_name,
                        colonies = state.registry.count(),
                        "restored ecosystem snapshot"
                    );
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "no snapshot found, starting empty");
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "snapshot unreadable, starting empty"
                    );
                }
            }
        }

        let (migration_tx, migration_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            state: Arc::new(Mutex::new(state)),
            host,
            config,
            migration_tx,
            broadcast_tx,
            queues: Mutex::new(Some((migration_rx, broadcast_rx))),
            shutdown_tx,
            running: AtomicBool::new(false),
            worker: Mutex::new(None),
            store_path,
            transfer_seq: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &EcosystemConfig {
        &self.config
    }

    /// Register a colony. Idempotent.
    pub async fn register_colony(&self, colony_id: ColonyId, location: &str) -> ColonyInfo {
        let mut state = self.state.lock().await;
        state.registry.register(colony_id, location, now_ms()).clone()
    }

    /// Fire-and-forget stat report from a colony.
    pub async fn update_colony_stats(
        &self,
        colony_id: &ColonyId,
        population: u64,
        generation_max: u64,
        knowledge_entries: u64,
        health_average: f64,
    ) {
        let mut state = self.state.lock().await;
        state.registry.update_stats(
            colony_id,
            population,
            generation_max,
            knowledge_entries,
            health_average,
        );
    }

    pub async fn add_specialization(&self, colony_id: &ColonyId, label: &str) {
        let mut state = self.state.lock().await;
        state.registry.add_specialization(colony_id, label);
    }

    pub async fn establish_alliance(&self, a: &ColonyId, b: &ColonyId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.registry.establish_alliance(a, b)
    }

    pub async fn list_colonies(&self) -> Vec<ColonyInfo> {
        let state = self.state.lock().await;
        state.registry.all()
    }

    pub async fn get_ecosystem_health(&self) -> EcosystemHealthReport {
        let state = self.state.lock().await;
        analyzer::analyze(&state, &self.config, now_ms())
    }

    /// The most recent `limit` migration records, oldest first.
    pub async fn list_migration_history(&self, limit: usize) -> Vec<MigrationRecord> {
        let state = self.state.lock().await;
        let start = state.migration_history.len().saturating_sub(limit);
        state.migration_history[start..].to_vec()
    }

    /// The most recent `limit` gene transfers, oldest first.
    pub async fn list_gene_transfers(&self, limit: usize) -> Vec<GeneTransfer> {
        let state = self.state.lock().await;
        let start = state.gene_transfers.len().saturating_sub(limit);
        state.gene_transfers[start..].to_vec()
    }

    /// Contribute a shared knowledge item to the ecosystem ring.
    pub async fn record_knowledge(&self, item: KnowledgeItem) {
        let mut state = self.state.lock().await;
        state.record_knowledge(item);
    }

    /// Request a migration for an agent. Admission and the history
    /// append happen in one critical section, so two concurrent requests
    /// cannot jointly exceed the rate limit. On admission the source
    /// agent is told to terminate and the packet is queued; the call
    /// never blocks on the queue.
    pub async fn request_migration(
        &self,
        agent: &dyn MigratableAgent,
        target: &ColonyId,
        reason: &str,
    ) -> bool {
        let packet = {
            let mut state = self.state.lock().await;
            pipeline::initiate(&mut state, &self.config, agent, target, reason, now_ms())
        };
        let Some(packet) = packet else {
            return false;
        };

        agent.terminate("migration departure");

        if self.migration_tx.send(packet.clone()).is_err() {
            // Queue closed after a final stop; keep the audit trail honest.
            let mut state = self.state.lock().await;
            if let Some(record) = state.record_mut(&packet.migration_id) {
                record.status = MigrationStatus::Failed("coordinator stopped".to_string());
            }
            warn!(agent = %packet.agent_id, "migration admitted but coordinator is stopped");
        }
        true
    }

    /// Share a subset of an agent's traits with a target colony. Returns
    /// false when none of the requested trait names are known to the
    /// source.
    pub async fn share_traits(
        &self,
        agent: &dyn MigratableAgent,
        target_colony: &ColonyId,
        trait_names: &[&str],
    ) -> bool {
        let Some(transfer) = gene_transfer::initiate(agent, target_colony, trait_names, now_ms())
        else {
            return false;
        };
        let notice = BroadcastNotice {
            transfer_id: transfer.transfer_id,
            target_colony: target_colony.clone(),
        };

        {
            let mut state = self.state.lock().await;
            state.gene_transfers.push(transfer);
            state.total_gene_transfers += 1;
        }

        if self.broadcast_tx.send(notice).is_err() {
            warn!(colony = %target_colony, "gene transfer recorded but coordinator is stopped");
        }
        true
    }

    /// Start the background worker. Safe to call repeatedly; only the
    /// first call spawns.
    pub async fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some((migration_rx, broadcast_rx)) = self.queues.lock().await.take() else {
            self.running.store(false, Ordering::SeqCst);
            warn!("coordinator already ran; restart after stop is not supported");
            return;
        };

        let coordinator = Arc::clone(self);
        let handle = tokio::spawn(coordinator.run_worker(migration_rx, broadcast_rx));
        *self.worker.lock().await = Some(handle);
        info!(tick_interval_ms = self.config.tick_interval_ms, "coordinator started");
    }

    /// Signal the worker to exit after its current tick, wait for it,
    /// and flush the snapshot. Safe to call repeatedly. In-flight
    /// quarantine tasks run to completion: aborting mid-integration
    /// would leave a half-constructed migrant.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(true);

        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.flush().await;
        info!("coordinator stopped");
    }

    async fn run_worker(
        self: Arc<Self>,
        mut migration_rx: mpsc::UnboundedReceiver<MigrationPacket>,
        mut broadcast_rx: mpsc::UnboundedReceiver<BroadcastNotice>,
    ) {
        let mut shutdown = self.shutdown_tx.subscribe();
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms.max(1)));
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    ticks += 1;
                    self.drain_migrations(&mut migration_rx).await;
                    self.drain_broadcasts(&mut broadcast_rx).await;
                    self.health_check().await;
                    if self.config.persist_every_ticks > 0
                        && ticks % self.config.persist_every_ticks == 0
                    {
                        self.flush().await;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!(ticks, "coordinator worker exited");
    }

    /// Move every queued packet into quarantine. Each packet gets its own
    /// task so quarantine delays overlap instead of serializing.
    async fn drain_migrations(&self, rx: &mut mpsc::UnboundedReceiver<MigrationPacket>) {
        while let Ok(packet) = rx.try_recv() {
            {
                let mut state = self.state.lock().await;
                if let Some(record) = state.record_mut(&packet.migration_id) {
                    record.status = MigrationStatus::Quarantined;
                }
            }
            debug!(
                agent = %packet.agent_id,
                target = %packet.target_colony,
                quarantine_ms = self.config.quarantine_ms,
                "migration quarantined"
            );

            let state = Arc::clone(&self.state);
            let host = Arc::clone(&self.host);
            let quarantine = Duration::from_millis(self.config.quarantine_ms);
            tokio::spawn(async move {
                tokio::time::sleep(quarantine).await;

                let mut state = state.lock().await;
                match pipeline::integrate(&mut state, host.as_ref(), &packet) {
                    Ok(migrant_id) => {
                        if let Some(record) = state.record_mut(&packet.migration_id) {
                            record.status = MigrationStatus::Integrated;
                        }
                        info!(
                            agent = %migrant_id,
                            colony = %packet.target_colony,
                            "migrant integrated"
                        );
                    }
                    Err(e) => {
                        // A failed integration never takes the loop down
                        // or loses the packet's audit trail.
                        if let Some(record) = state.record_mut(&packet.migration_id) {
                            record.status = MigrationStatus::Failed(e.to_string());
                        }
                        warn!(
                            agent = %packet.agent_id,
                            colony = %packet.target_colony,
                            error = %e,
                            "migrant integration failed"
                        );
                    }
                }
            });
        }
    }

    /// Apply pending gene transfers to recipients in their target
    /// colonies.
    async fn drain_broadcasts(&self, rx: &mut mpsc::UnboundedReceiver<BroadcastNotice>) {
        while let Ok(notice) = rx.try_recv() {
            let recipient = self.host.select_recipient(&notice.target_colony);
            let seed = self.transfer_seq.fetch_add(1, Ordering::Relaxed);

            let mut state = self.state.lock().await;
            let Some(transfer) = state.transfer_mut(&notice.transfer_id) else {
                continue;
            };
            match recipient {
                Some(agent) => {
                    let applied = gene_transfer::apply(agent.as_ref(), transfer, seed);
                    transfer.target_agent = Some(agent.agent_id());
                    transfer.success = Some(applied);
                    debug!(
                        recipient = %agent.agent_id(),
                        colony = %notice.target_colony,
                        applied,
                        "gene transfer applied"
                    );
                }
                None => {
                    transfer.success = Some(false);
                    debug!(colony = %notice.target_colony, "no recipient for gene transfer");
                }
            }
        }
    }

    async fn health_check(&self) {
        let report = {
            let state = self.state.lock().await;
            analyzer::analyze(&state, &self.config, now_ms())
        };
        if report.status != EcosystemStatus::Empty
            && report.average_health < self.config.low_health_warning
        {
            warn!(
                average_health = report.average_health,
                colonies = report.colony_count,
                "ecosystem health degraded"
            );
        }
    }

    /// Persist the snapshot, if a store path was configured. Failures are
    /// logged and the in-memory state stays authoritative.
    async fn flush(&self) {
        let Some(path) = &self.store_path else {
            return;
        };
        let state = self.state.lock().await;
        if let Err(e) = session::save_ecosystem(&state, path) {
            warn!(path = %path.display(), error = %e, "failed to persist ecosystem snapshot");
        }
    }
}
