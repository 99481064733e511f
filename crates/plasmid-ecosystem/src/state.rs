//! Ecosystem state — the aggregate the coordinator guards.
//!
//! One `EcosystemState` exists per ecosystem name, constructed at startup
//! (optionally restored from a snapshot) and torn down at shutdown. All
//! mutation goes through the single coarse lock held by the coordinator;
//! mutation frequency is low relative to reads, so one lock is enough.

use crate::gene_transfer::GeneTransfer;
use crate::pipeline::MigrationRecord;
use crate::registry::ColonyRegistry;
use plasmid_core::types::{KnowledgeItem, MigrationId, TransferId};
use std::collections::VecDeque;

/// The aggregate root: colonies, migration history, gene transfers, and
/// the shared knowledge ring.
#[derive(Debug)]
pub struct EcosystemState {
    pub ecosystem_name: String,
    pub registry: ColonyRegistry,
    /// Append-only log of admitted migrations.
    pub migration_history: Vec<MigrationRecord>,
    /// Append-only log of gene transfers.
    pub gene_transfers: Vec<GeneTransfer>,
    /// Fixed-capacity ring of shared knowledge, oldest evicted first.
    pub ecosystem_knowledge: VecDeque<KnowledgeItem>,
    knowledge_capacity: usize,
    /// Lifetime counters, persisted across restarts.
    pub total_migrations: u64,
    pub total_gene_transfers: u64,
}

impl EcosystemState {
    pub fn new(ecosystem_name: impl Into<String>, knowledge_capacity: usize) -> Self {
        Self {
            ecosystem_name: ecosystem_name.into(),
            registry: ColonyRegistry::new(),
            migration_history: Vec::new(),
            gene_transfers: Vec::new(),
            ecosystem_knowledge: VecDeque::with_capacity(knowledge_capacity),
            knowledge_capacity,
            total_migrations: 0,
            total_gene_transfers: 0,
        }
    }

    /// Push a shared knowledge item, evicting the oldest entry once the
    /// ring is full.
    pub fn record_knowledge(&mut self, item: KnowledgeItem) {
        if self.knowledge_capacity == 0 {
            return;
        }
        if self.ecosystem_knowledge.len() == self.knowledge_capacity {
            self.ecosystem_knowledge.pop_front();
        }
        self.ecosystem_knowledge.push_back(item);
    }

    pub fn record_mut(&mut self, id: &MigrationId) -> Option<&mut MigrationRecord> {
        self.migration_history
            .iter_mut()
            .rev()
            .find(|record| record.packet.migration_id == *id)
    }

    pub fn transfer_mut(&mut self, id: &TransferId) -> Option<&mut GeneTransfer> {
        self.gene_transfers
            .iter_mut()
            .rev()
            .find(|transfer| transfer.transfer_id == *id)
    }
}
