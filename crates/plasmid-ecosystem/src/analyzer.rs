//! Ecosystem health analytics.
//!
//! Derives population-weighted health, genetic diversity, and
//! migration-flow statistics from the registry and the bounded history.
//! Everything is computed on demand from the current state; nothing here
//! mutates.

use crate::config::EcosystemConfig;
use crate::state::EcosystemState;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Weighted average health above which the ecosystem counts as healthy.
const HEALTHY_THRESHOLD: f64 = 70.0;

/// Overall condition of the ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcosystemStatus {
    Empty,
    Healthy,
    Struggling,
}

impl std::fmt::Display for EcosystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EcosystemStatus::Empty => write!(f, "empty"),
            EcosystemStatus::Healthy => write!(f, "healthy"),
            EcosystemStatus::Struggling => write!(f, "struggling"),
        }
    }
}

/// On-demand health report over the whole ecosystem.
#[derive(Debug, Clone, Serialize)]
pub struct EcosystemHealthReport {
    pub status: EcosystemStatus,
    /// Population-weighted mean of colony health averages.
    pub average_health: f64,
    /// Distinct specializations per colony.
    pub genetic_diversity: f64,
    /// Migrations per "source->target" pair inside the lookback window.
    pub migration_flow: HashMap<String, usize>,
    /// Shared knowledge items grouped by their declared type.
    pub knowledge_type_distribution: HashMap<String, usize>,
    pub max_generation: u64,
    pub colony_count: usize,
    pub total_population: u64,
}

/// Compute the health report from the current registry and history.
pub fn analyze(state: &EcosystemState, config: &EcosystemConfig, now_ms: u64) -> EcosystemHealthReport {
    let colony_count = state.registry.count();

    let mut weighted = 0.0;
    let mut total_population = 0u64;
    let mut specializations: HashSet<&str> = HashSet::new();
    let mut max_generation = 0u64;

    for info in state.registry.iter() {
        weighted += info.population as f64 * info.health_average;
        total_population += info.population;
        specializations.extend(info.specializations.iter().map(|s| s.as_str()));
        max_generation = max_generation.max(info.generation_max);
    }

    let average_health = if total_population > 0 {
        weighted / total_population as f64
    } else {
        0.0
    };

    let genetic_diversity = if colony_count > 0 {
        specializations.len() as f64 / colony_count as f64
    } else {
        0.0
    };

    let status = if colony_count == 0 {
        EcosystemStatus::Empty
    } else if average_health > HEALTHY_THRESHOLD {
        EcosystemStatus::Healthy
    } else {
        EcosystemStatus::Struggling
    };

    let cutoff = now_ms.saturating_sub(config.migration_lookback_ms);
    let mut migration_flow: HashMap<String, usize> = HashMap::new();
    for record in &state.migration_history {
        if record.packet.timestamp_ms <= cutoff {
            continue;
        }
        let key = format!(
            "{}->{}",
            record.packet.source_colony, record.packet.target_colony
        );
        *migration_flow.entry(key).or_insert(0) += 1;
    }

    let mut knowledge_type_distribution: HashMap<String, usize> = HashMap::new();
    for item in &state.ecosystem_knowledge {
        *knowledge_type_distribution
            .entry(item.knowledge_type.clone())
            .or_insert(0) += 1;
    }

    EcosystemHealthReport {
        status,
        average_health,
        genetic_diversity,
        migration_flow,
        knowledge_type_distribution,
        max_generation,
        colony_count,
        total_population,
    }
}
