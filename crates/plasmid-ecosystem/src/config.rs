//! Tunable parameters for ecosystem coordination.

use serde::{Deserialize, Serialize};

/// Configuration for admission control, migration timing, and analytics.
///
/// All durations are milliseconds so the admission rules stay pure
/// integer arithmetic over packet timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemConfig {
    /// Minimum agent health required to migrate (default: 70.0).
    pub min_health_threshold: f64,
    /// Maximum relative population imbalance between source and target
    /// (default: 0.5).
    pub max_population_imbalance: f64,
    /// Maximum admitted migrations inside the rate-limit window
    /// (default: 10).
    pub max_migrations_per_hour: usize,
    /// Trailing window for the migration rate limit (default: 1 hour).
    pub rate_limit_window_ms: u64,
    /// Delay between admission and target-side integration
    /// (default: 60 s). Throttles colonization bursts.
    pub quarantine_ms: u64,
    /// Coordinator tick interval (default: 10 s).
    pub tick_interval_ms: u64,
    /// Lookback window for migration-flow analytics (default: 7 days).
    pub migration_lookback_ms: u64,
    /// Capacity of the shared knowledge ring buffer (default: 200).
    pub knowledge_capacity: usize,
    /// Most recent entries kept per memory-snapshot list (default: 20).
    pub memory_excerpt_cap: usize,
    /// Most recent shared-knowledge items carried by a packet
    /// (default: 10).
    pub knowledge_excerpt_cap: usize,
    /// Weighted average health below which the coordinator logs a
    /// warning (default: 50.0).
    pub low_health_warning: f64,
    /// Snapshot flush cadence in coordinator ticks; 0 disables periodic
    /// flushes (default: 30).
    pub persist_every_ticks: u64,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            min_health_threshold: 70.0,
            max_population_imbalance: 0.5,
            max_migrations_per_hour: 10,
            rate_limit_window_ms: 3_600_000,
            quarantine_ms: 60_000,
            tick_interval_ms: 10_000,
            migration_lookback_ms: 7 * 24 * 3_600_000,
            knowledge_capacity: 200,
            memory_excerpt_cap: 20,
            knowledge_excerpt_cap: 10,
            low_health_warning: 50.0,
            persist_every_ticks: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = EcosystemConfig::default();
        assert_eq!(config.min_health_threshold, 70.0);
        assert_eq!(config.max_migrations_per_hour, 10);
        assert_eq!(config.rate_limit_window_ms, 3_600_000);
        assert!(config.quarantine_ms < config.rate_limit_window_ms);
        assert!(config.knowledge_excerpt_cap <= config.knowledge_capacity);
    }
}
