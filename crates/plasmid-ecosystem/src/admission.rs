//! Admission control for inter-colony migration.
//!
//! A pure decision function over the current registry and migration
//! history. Denial is a normal result value, never an error; callers
//! branch on it routinely. The caller must hold the ecosystem lock
//! across the evaluation and any immediately following packet append so
//! that two concurrent requests cannot both pass the rate-limit check.

use crate::config::EcosystemConfig;
use crate::pipeline::MigrationRecord;
use crate::registry::ColonyRegistry;
use plasmid_core::types::ColonyId;
use serde::Serialize;

/// Outcome of an admission check.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionVerdict {
    pub allowed: bool,
    pub reason: String,
}

impl AdmissionVerdict {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: "accepted".to_string(),
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Decide whether an agent may migrate. Rules apply in order; the first
/// failure wins:
///
/// 1. the agent must be healthy enough to survive relocation;
/// 2. both colonies must be registered;
/// 3. the move must not worsen an already-imbalanced population;
/// 4. the ecosystem-wide migration rate must be under the cap, counted
///    over the full sliding window rather than a fixed-size tail so
///    bursts are never undercounted.
pub fn evaluate(
    registry: &ColonyRegistry,
    history: &[MigrationRecord],
    config: &EcosystemConfig,
    source: &ColonyId,
    target: &ColonyId,
    agent_health: f64,
    now_ms: u64,
) -> AdmissionVerdict {
    if agent_health < config.min_health_threshold {
        return AdmissionVerdict::deny("health too low");
    }

    let (source_info, target_info) = match (registry.lookup(source), registry.lookup(target)) {
        (Some(s), Some(t)) => (s, t),
        _ => return AdmissionVerdict::deny("invalid colony"),
    };

    if target_info.population > 0 {
        let larger = source_info.population.max(target_info.population) as f64;
        let gap = (source_info.population as f64 - target_info.population as f64).abs();
        if gap / larger > config.max_population_imbalance {
            return AdmissionVerdict::deny("population imbalance");
        }
    }

    let cutoff = now_ms.saturating_sub(config.rate_limit_window_ms);
    let recent = history
        .iter()
        .filter(|record| record.packet.timestamp_ms > cutoff)
        .count();
    if recent >= config.max_migrations_per_hour {
        return AdmissionVerdict::deny("rate limit reached");
    }

    AdmissionVerdict::allow()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{MigrationPacket, MigrationRecord};
    use plasmid_core::types::{AgentId, GeneticProfile, MemorySnapshot, MigrationId};

    fn id(s: &str) -> ColonyId {
        ColonyId::new(s)
    }

    fn registry_with(populations: &[(&str, u64)]) -> ColonyRegistry {
        let mut registry = ColonyRegistry::new();
        for (name, population) in populations {
            registry.register(id(name), format!("/colonies/{}", name), 0);
            registry.update_stats(&id(name), *population, 0, 0, 90.0);
        }
        registry
    }

    fn record_at(timestamp_ms: u64) -> MigrationRecord {
        MigrationRecord::queued(MigrationPacket {
            migration_id: MigrationId::new(),
            agent_id: AgentId::new("a"),
            source_colony: id("a"),
            target_colony: id("b"),
            genetic_profile: GeneticProfile::default(),
            memory_snapshot: MemorySnapshot::default(),
            knowledge_excerpt: Vec::new(),
            timestamp_ms,
            reason: "test".to_string(),
        })
    }

    #[test]
    fn low_health_denied_regardless_of_colonies() {
        let registry = ColonyRegistry::new();
        let config = EcosystemConfig::default();

        // Neither colony exists, yet the health rule fires first
        let verdict = evaluate(&registry, &[], &config, &id("a"), &id("b"), 50.0, 0);
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, "health too low");
    }

    #[test]
    fn unknown_colony_denied() {
        let registry = registry_with(&[("a", 10)]);
        let config = EcosystemConfig::default();

        let verdict = evaluate(&registry, &[], &config, &id("a"), &id("missing"), 90.0, 0);
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, "invalid colony");
    }

    #[test]
    fn population_imbalance_denied() {
        let registry = registry_with(&[("big", 100), ("small", 10)]);
        let config = EcosystemConfig::default();

        // |100 - 10| / 100 = 0.9 > 0.5
        let verdict = evaluate(&registry, &[], &config, &id("big"), &id("small"), 90.0, 0);
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, "population imbalance");
    }

    #[test]
    fn empty_target_skips_imbalance_check() {
        let registry = registry_with(&[("big", 100), ("new", 0)]);
        let config = EcosystemConfig::default();

        let verdict = evaluate(&registry, &[], &config, &id("big"), &id("new"), 90.0, 0);
        assert!(verdict.allowed, "got: {}", verdict.reason);
    }

    #[test]
    fn balanced_colonies_allowed() {
        let registry = registry_with(&[("a", 40), ("b", 30)]);
        let config = EcosystemConfig::default();

        let verdict = evaluate(&registry, &[], &config, &id("a"), &id("b"), 75.0, 0);
        assert!(verdict.allowed);
        assert_eq!(verdict.reason, "accepted");
    }

    #[test]
    fn rate_limit_counts_sliding_window() {
        let registry = registry_with(&[("a", 40), ("b", 30)]);
        let config = EcosystemConfig::default();
        let now = 10_000_000;

        // Ten admitted migrations inside the trailing hour
        let history: Vec<MigrationRecord> =
            (0..10).map(|i| record_at(now - 1_000 * i)).collect();

        let verdict = evaluate(&registry, &history, &config, &id("a"), &id("b"), 90.0, now);
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, "rate limit reached");

        // Once the window slides past the oldest entries, the same
        // request is admitted again
        let later = now + config.rate_limit_window_ms;
        let verdict = evaluate(&registry, &history, &config, &id("a"), &id("b"), 90.0, later);
        assert!(verdict.allowed);
    }

    #[test]
    fn rate_limit_sees_past_any_tail_slice() {
        let registry = registry_with(&[("a", 40), ("b", 30)]);
        let config = EcosystemConfig {
            max_migrations_per_hour: 60,
            ..Default::default()
        };
        let now = 10_000_000;

        // A burst far larger than any fixed tail slice, all within the
        // window: every entry must count
        let history: Vec<MigrationRecord> =
            (0..60).map(|i| record_at(now - 10 * i)).collect();

        let verdict = evaluate(&registry, &history, &config, &id("a"), &id("b"), 90.0, now);
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, "rate limit reached");
    }
}
