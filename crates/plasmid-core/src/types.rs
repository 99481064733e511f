//! Shared types used across the plasmid crates.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Identifier of a colony, chosen by the process that registers it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColonyId(pub String);

impl ColonyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ColonyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an agent within the ecosystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identity assigned to the reconstructed copy of this agent when it
    /// is integrated into a target colony.
    pub fn migrant(&self) -> AgentId {
        AgentId(format!("{}_migrant", self.0))
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one migration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MigrationId(pub Uuid);

impl MigrationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MigrationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for one gene transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(pub Uuid);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

/// Current Unix timestamp in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A numeric or categorical trait value carried by a gene transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraitValue {
    Number(f64),
    Text(String),
}

impl TraitValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TraitValue::Number(v) => Some(*v),
            TraitValue::Text(_) => None,
        }
    }
}

/// Evolvable parameters carried by an agent.
///
/// The four numeric parameters are addressable by name for gene transfer;
/// `generation` counts how many migrations the lineage has been through
/// and is never transferred on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticProfile {
    pub mutation_rate: f64,
    pub adaptation_speed: f64,
    pub scan_frequency: f64,
    pub error_tolerance: f64,
    pub generation: u64,
}

impl Default for GeneticProfile {
    fn default() -> Self {
        Self {
            mutation_rate: 0.1,
            adaptation_speed: 1.0,
            scan_frequency: 1.0,
            error_tolerance: 0.5,
            generation: 0,
        }
    }
}

impl GeneticProfile {
    /// Names of the transferable traits.
    pub fn trait_names() -> [&'static str; 4] {
        [
            "mutation_rate",
            "adaptation_speed",
            "scan_frequency",
            "error_tolerance",
        ]
    }

    /// Look up a trait by name. Unknown names yield `None`.
    pub fn trait_value(&self, name: &str) -> Option<TraitValue> {
        match name {
            "mutation_rate" => Some(TraitValue::Number(self.mutation_rate)),
            "adaptation_speed" => Some(TraitValue::Number(self.adaptation_speed)),
            "scan_frequency" => Some(TraitValue::Number(self.scan_frequency)),
            "error_tolerance" => Some(TraitValue::Number(self.error_tolerance)),
            _ => None,
        }
    }

    /// Assign a trait by name. Returns false for unknown names or
    /// non-numeric values, leaving the profile unchanged.
    pub fn set_trait_value(&mut self, name: &str, value: &TraitValue) -> bool {
        let Some(v) = value.as_number() else {
            return false;
        };
        match name {
            "mutation_rate" => self.mutation_rate = v,
            "adaptation_speed" => self.adaptation_speed = v,
            "scan_frequency" => self.scan_frequency = v,
            "error_tolerance" => self.error_tolerance = v,
            _ => return false,
        }
        true
    }
}

/// A bounded excerpt of an agent's working memory, carried by a
/// migration packet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// Identifiers of files the agent has scanned.
    pub scanned_files: Vec<String>,
    /// Learned pattern labels with their observation counts.
    pub learned_patterns: Vec<(String, u64)>,
    pub recent_errors: Vec<String>,
    pub recent_performance: Vec<f64>,
}

impl MemorySnapshot {
    /// Keep only the most recent `cap` entries of each list.
    pub fn truncated(mut self, cap: usize) -> Self {
        fn tail<T>(items: &mut Vec<T>, cap: usize) {
            if items.len() > cap {
                let excess = items.len() - cap;
                items.drain(..excess);
            }
        }
        tail(&mut self.scanned_files, cap);
        tail(&mut self.learned_patterns, cap);
        tail(&mut self.recent_errors, cap);
        tail(&mut self.recent_performance, cap);
        self
    }
}

/// A shared knowledge item circulating in the ecosystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// Declared type of the item, used for distribution analytics.
    pub knowledge_type: String,
    pub content: String,
    /// Colony the item arrived from, when it came in via migration.
    pub source_colony: Option<ColonyId>,
    pub recorded_at_ms: u64,
}

impl KnowledgeItem {
    pub fn new(knowledge_type: impl Into<String>, content: impl Into<String>, now_ms: u64) -> Self {
        Self {
            knowledge_type: knowledge_type.into(),
            content: content.into(),
            source_colony: None,
            recorded_at_ms: now_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrant_identity_is_derived() {
        let id = AgentId::new("scout-7");
        assert_eq!(id.migrant().as_str(), "scout-7_migrant");
    }

    #[test]
    fn profile_traits_by_name() {
        let mut profile = GeneticProfile::default();
        assert_eq!(
            profile.trait_value("mutation_rate"),
            Some(TraitValue::Number(0.1))
        );
        assert_eq!(profile.trait_value("nonexistent"), None);

        assert!(profile.set_trait_value("scan_frequency", &TraitValue::Number(2.5)));
        assert!((profile.scan_frequency - 2.5).abs() < 1e-12);

        // Text payloads never overwrite numeric parameters
        assert!(!profile.set_trait_value("scan_frequency", &TraitValue::Text("fast".into())));
        assert!((profile.scan_frequency - 2.5).abs() < 1e-12);
    }

    #[test]
    fn snapshot_truncation_keeps_most_recent() {
        let snapshot = MemorySnapshot {
            scanned_files: (0..10).map(|i| format!("file_{}", i)).collect(),
            learned_patterns: vec![("loop".into(), 3), ("recursion".into(), 1)],
            recent_errors: vec!["parse error".into()],
            recent_performance: (0..10).map(|i| i as f64).collect(),
        };

        let capped = snapshot.truncated(4);
        assert_eq!(capped.scanned_files.len(), 4);
        assert_eq!(capped.scanned_files[0], "file_6");
        assert_eq!(capped.learned_patterns.len(), 2);
        assert_eq!(capped.recent_performance, vec![6.0, 7.0, 8.0, 9.0]);
    }
}
