//! Ecosystem snapshot persistence — save/load to JSON.
//!
//! The on-disk snapshot is a summary, not a replay log: colony records
//! plus lifetime counters, keyed by ecosystem name. A missing or corrupt
//! file is never fatal; the ecosystem starts empty and the in-memory
//! state stays authoritative for the running process.

use crate::state::EcosystemState;
use plasmid_core::types::ColonyId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Serializable snapshot of the ecosystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemSnapshot {
    pub ecosystem_name: String,
    pub colonies: Vec<ColonyRecord>,
    pub total_migrations: u64,
    pub total_gene_transfers: u64,
}

/// Serializable colony record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyRecord {
    pub colony_id: String,
    pub location: String,
    pub created_at_ms: u64,
    pub population: u64,
    pub generation_max: u64,
    pub knowledge_entries: u64,
    pub health_average: f64,
    pub specializations: Vec<String>,
    pub allied_colonies: Vec<String>,
}

/// Build a snapshot of the current state.
pub fn snapshot_of(state: &EcosystemState) -> EcosystemSnapshot {
    let mut colonies: Vec<ColonyRecord> = state
        .registry
        .iter()
        .map(|info| ColonyRecord {
            colony_id: info.colony_id.as_str().to_string(),
            location: info.location.clone(),
            created_at_ms: info.created_at_ms,
            population: info.population,
            generation_max: info.generation_max,
            knowledge_entries: info.knowledge_entries,
            health_average: info.health_average,
            specializations: info.specializations.iter().cloned().collect(),
            allied_colonies: info
                .allied_colonies
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        })
        .collect();
    colonies.sort_by(|a, b| a.colony_id.cmp(&b.colony_id));

    EcosystemSnapshot {
        ecosystem_name: state.ecosystem_name.clone(),
        colonies,
        total_migrations: state.total_migrations,
        total_gene_transfers: state.total_gene_transfers,
    }
}

/// Save the ecosystem snapshot to a JSON file.
pub fn save_ecosystem(state: &EcosystemState, path: &Path) -> std::io::Result<()> {
    let snapshot = snapshot_of(state);
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
}

/// Load a saved snapshot from JSON.
pub fn load_ecosystem(path: &Path) -> std::io::Result<EcosystemSnapshot> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Restore a snapshot into an ecosystem state.
pub fn restore_into_state(state: &mut EcosystemState, snapshot: &EcosystemSnapshot) {
    for record in &snapshot.colonies {
        let colony_id = ColonyId::new(record.colony_id.clone());
        state
            .registry
            .register(colony_id.clone(), record.location.clone(), record.created_at_ms);
        state.registry.update_stats(
            &colony_id,
            record.population,
            record.generation_max,
            record.knowledge_entries,
            record.health_average,
        );
        if let Some(info) = state.registry.get_mut(&colony_id) {
            info.created_at_ms = record.created_at_ms;
            info.specializations = record.specializations.iter().cloned().collect();
            info.allied_colonies = record
                .allied_colonies
                .iter()
                .map(|id| ColonyId::new(id.clone()))
                .collect::<BTreeSet<_>>();
        }
    }
    state.total_migrations = snapshot.total_migrations;
    state.total_gene_transfers = snapshot.total_gene_transfers;
}
