//! Colony registry — authoritative record of known colonies.
//!
//! Tracks each colony's published statistics and alliance relationships.
//! Registration is idempotent, and stat updates are fire-and-forget so
//! that agents may report before their colony finishes registering.
//! Colonies are never removed during a run.

use plasmid_core::error::{EcosystemError, Result};
use plasmid_core::types::ColonyId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Published information about one colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyInfo {
    pub colony_id: ColonyId,
    /// Opaque path or identifier of the colony's analysis target.
    pub location: String,
    pub created_at_ms: u64,
    pub population: u64,
    pub generation_max: u64,
    pub knowledge_entries: u64,
    /// Mean agent health reported by the colony (0-100).
    pub health_average: f64,
    pub specializations: BTreeSet<String>,
    pub allied_colonies: BTreeSet<ColonyId>,
}

impl ColonyInfo {
    pub fn new(colony_id: ColonyId, location: impl Into<String>, now_ms: u64) -> Self {
        Self {
            colony_id,
            location: location.into(),
            created_at_ms: now_ms,
            population: 0,
            generation_max: 0,
            knowledge_entries: 0,
            health_average: 100.0,
            specializations: BTreeSet::new(),
            allied_colonies: BTreeSet::new(),
        }
    }
}

/// Registry of all colonies known to the ecosystem.
#[derive(Debug, Default)]
pub struct ColonyRegistry {
    colonies: HashMap<ColonyId, ColonyInfo>,
}

impl ColonyRegistry {
    pub fn new() -> Self {
        Self {
            colonies: HashMap::new(),
        }
    }

    /// Register a colony. Idempotent: re-registering an existing colony
    /// returns its record unchanged.
    pub fn register(
        &mut self,
        colony_id: ColonyId,
        location: impl Into<String>,
        now_ms: u64,
    ) -> &ColonyInfo {
        self.colonies
            .entry(colony_id.clone())
            .or_insert_with(|| ColonyInfo::new(colony_id, location, now_ms))
    }

    /// Update a colony's published statistics. Unknown colonies are
    /// silently ignored: stat reports may race registration.
    pub fn update_stats(
        &mut self,
        colony_id: &ColonyId,
        population: u64,
        generation_max: u64,
        knowledge_entries: u64,
        health_average: f64,
    ) {
        if let Some(info) = self.colonies.get_mut(colony_id) {
            info.population = population;
            info.generation_max = generation_max;
            info.knowledge_entries = knowledge_entries;
            info.health_average = health_average.clamp(0.0, 100.0);
        }
    }

    /// Advertise a specialization for a colony. Fire-and-forget like
    /// stat updates.
    pub fn add_specialization(&mut self, colony_id: &ColonyId, label: impl Into<String>) {
        if let Some(info) = self.colonies.get_mut(colony_id) {
            info.specializations.insert(label.into());
        }
    }

    /// Record a mutual alliance between two colonies.
    ///
    /// Alliance membership stays symmetric: after this call B is in A's
    /// allied set and A is in B's. Repeated calls are no-ops.
    pub fn establish_alliance(&mut self, a: &ColonyId, b: &ColonyId) -> Result<()> {
        if !self.colonies.contains_key(a) {
            return Err(EcosystemError::ColonyNotFound(a.clone()));
        }
        if !self.colonies.contains_key(b) {
            return Err(EcosystemError::ColonyNotFound(b.clone()));
        }
        if a == b {
            return Ok(());
        }
        if let Some(info) = self.colonies.get_mut(a) {
            info.allied_colonies.insert(b.clone());
        }
        if let Some(info) = self.colonies.get_mut(b) {
            info.allied_colonies.insert(a.clone());
        }
        Ok(())
    }

    pub fn lookup(&self, colony_id: &ColonyId) -> Option<&ColonyInfo> {
        self.colonies.get(colony_id)
    }

    pub fn get_mut(&mut self, colony_id: &ColonyId) -> Option<&mut ColonyInfo> {
        self.colonies.get_mut(colony_id)
    }

    pub fn contains(&self, colony_id: &ColonyId) -> bool {
        self.colonies.contains_key(colony_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColonyInfo> {
        self.colonies.values()
    }

    /// All colony records, cloned for handing across the lock boundary.
    pub fn all(&self) -> Vec<ColonyInfo> {
        self.colonies.values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.colonies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ColonyId {
        ColonyId::new(s)
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = ColonyRegistry::new();
        registry.register(id("alpha"), "/srv/alpha", 1_000);
        registry.update_stats(&id("alpha"), 12, 3, 40, 88.0);

        // Re-registration must not reset existing stats
        let info = registry.register(id("alpha"), "/other/path", 9_999).clone();
        assert_eq!(info.population, 12);
        assert_eq!(info.location, "/srv/alpha");
        assert_eq!(info.created_at_ms, 1_000);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn new_colonies_start_empty() {
        let mut registry = ColonyRegistry::new();
        let info = registry.register(id("alpha"), "/srv/alpha", 5).clone();
        assert_eq!(info.population, 0);
        assert!(info.specializations.is_empty());
        assert!(info.allied_colonies.is_empty());
    }

    #[test]
    fn update_stats_ignores_unknown_colony() {
        let mut registry = ColonyRegistry::new();
        registry.update_stats(&id("ghost"), 5, 1, 0, 90.0);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn update_stats_clamps_health() {
        let mut registry = ColonyRegistry::new();
        registry.register(id("alpha"), "/srv/alpha", 0);
        registry.update_stats(&id("alpha"), 1, 0, 0, 250.0);
        assert_eq!(registry.lookup(&id("alpha")).unwrap().health_average, 100.0);
    }

    #[test]
    fn alliance_is_symmetric_and_idempotent() {
        let mut registry = ColonyRegistry::new();
        registry.register(id("alpha"), "/a", 0);
        registry.register(id("beta"), "/b", 0);

        registry.establish_alliance(&id("alpha"), &id("beta")).unwrap();
        registry.establish_alliance(&id("alpha"), &id("beta")).unwrap();
        registry.establish_alliance(&id("beta"), &id("alpha")).unwrap();

        let alpha = registry.lookup(&id("alpha")).unwrap();
        let beta = registry.lookup(&id("beta")).unwrap();
        assert!(alpha.allied_colonies.contains(&id("beta")));
        assert!(beta.allied_colonies.contains(&id("alpha")));
        assert_eq!(alpha.allied_colonies.len(), 1);
        assert_eq!(beta.allied_colonies.len(), 1);
    }

    #[test]
    fn alliance_with_unknown_colony_fails() {
        let mut registry = ColonyRegistry::new();
        registry.register(id("alpha"), "/a", 0);

        let err = registry
            .establish_alliance(&id("alpha"), &id("ghost"))
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));

        // Nothing half-applied
        assert!(registry
            .lookup(&id("alpha"))
            .unwrap()
            .allied_colonies
            .is_empty());
    }
}
