//! Gene transfer — lightweight trait sharing between colonies.
//!
//! Unlike a migration, a gene transfer does not relocate an agent: a
//! subset of the source's genetic traits is broadcast to the target
//! colony and applied to a recipient chosen there. Numeric traits are
//! perturbed on application to model imperfect genetic expression.

use plasmid_core::agent::MigratableAgent;
use plasmid_core::types::{AgentId, ColonyId, TraitValue, TransferId};
use serde::{Deserialize, Serialize};

/// One trait-sharing event between colonies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneTransfer {
    pub transfer_id: TransferId,
    pub source_agent: AgentId,
    pub target_colony: ColonyId,
    /// Recipient, resolved lazily when the broadcast is applied.
    pub target_agent: Option<AgentId>,
    pub traits: Vec<(String, TraitValue)>,
    pub timestamp_ms: u64,
    /// Set exactly once, when application is attempted.
    pub success: Option<bool>,
}

/// Select the requested traits from the source agent and build a pending
/// transfer. Unknown trait names are silently dropped; an empty
/// selection yields no transfer.
pub fn initiate(
    source: &dyn MigratableAgent,
    target_colony: &ColonyId,
    trait_names: &[&str],
    now_ms: u64,
) -> Option<GeneTransfer> {
    let traits: Vec<(String, TraitValue)> = trait_names
        .iter()
        .filter_map(|name| source.trait_value(name).map(|value| (name.to_string(), value)))
        .collect();

    if traits.is_empty() {
        return None;
    }

    Some(GeneTransfer {
        transfer_id: TransferId::new(),
        source_agent: source.agent_id(),
        target_colony: target_colony.clone(),
        target_agent: None,
        traits,
        timestamp_ms: now_ms,
        success: None,
    })
}

/// Multiplicative jitter in [0.9, 1.1) from a deterministic LCG, so the
/// same seed reproduces the same expression.
fn expression_jitter(seed: u64) -> f64 {
    let mixed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    let unit = (mixed >> 33) as f64 / (1u64 << 31) as f64;
    0.9 + unit * 0.2
}

/// Apply a transfer to a recipient. Each carried trait the recipient also
/// has is applied: numeric values are perturbed by a uniform
/// multiplicative jitter in [0.9, 1.1] before assignment, text values
/// copy verbatim, and absent traits skip without error. Returns whether
/// at least one trait was applied — partial application is not a failure.
pub fn apply(recipient: &dyn MigratableAgent, transfer: &GeneTransfer, seed: u64) -> bool {
    let mut applied = 0usize;

    for (i, (name, value)) in transfer.traits.iter().enumerate() {
        if recipient.trait_value(name).is_none() {
            continue;
        }
        let incoming = match value {
            TraitValue::Number(v) => {
                TraitValue::Number(v * expression_jitter(seed.wrapping_add(i as u64)))
            }
            TraitValue::Text(t) => TraitValue::Text(t.clone()),
        };
        if recipient.set_trait_value(name, incoming) {
            applied += 1;
        }
    }

    applied > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use plasmid_core::types::{GeneticProfile, KnowledgeItem, MemorySnapshot};
    use std::sync::Mutex;

    struct StubAgent {
        id: AgentId,
        colony: ColonyId,
        profile: Mutex<GeneticProfile>,
        extra_traits: Vec<(String, TraitValue)>,
    }

    impl StubAgent {
        fn new(id: &str, colony: &str) -> Self {
            Self {
                id: AgentId::new(id),
                colony: ColonyId::new(colony),
                profile: Mutex::new(GeneticProfile::default()),
                extra_traits: Vec::new(),
            }
        }

        fn with_trait(mut self, name: &str, value: TraitValue) -> Self {
            self.extra_traits.push((name.to_string(), value));
            self
        }

        fn profile(&self) -> GeneticProfile {
            self.profile.lock().unwrap().clone()
        }
    }

    impl MigratableAgent for StubAgent {
        fn agent_id(&self) -> AgentId {
            self.id.clone()
        }
        fn colony_id(&self) -> ColonyId {
            self.colony.clone()
        }
        fn health(&self) -> f64 {
            100.0
        }
        fn genetic_profile(&self) -> GeneticProfile {
            self.profile()
        }
        fn memory_snapshot(&self) -> MemorySnapshot {
            MemorySnapshot::default()
        }
        fn colony_knowledge(&self) -> Vec<KnowledgeItem> {
            Vec::new()
        }
        fn trait_value(&self, name: &str) -> Option<TraitValue> {
            self.profile
                .lock()
                .unwrap()
                .trait_value(name)
                .or_else(|| {
                    self.extra_traits
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(_, v)| v.clone())
                })
        }
        fn set_trait_value(&self, name: &str, value: TraitValue) -> bool {
            if self.profile.lock().unwrap().set_trait_value(name, &value) {
                return true;
            }
            self.extra_traits.iter().any(|(n, _)| n == name)
        }
        fn terminate(&self, _reason: &str) {}
    }

    #[test]
    fn jitter_stays_in_expression_band() {
        for seed in 0..1_000 {
            let j = expression_jitter(seed);
            assert!((0.9..1.1).contains(&j), "seed {} escaped band: {}", seed, j);
        }
    }

    #[test]
    fn initiate_drops_unknown_traits() {
        let source = StubAgent::new("donor", "a");
        let transfer = initiate(
            &source,
            &ColonyId::new("b"),
            &["mutation_rate", "wing_span", "scan_frequency"],
            42,
        )
        .expect("two known traits remain");

        assert_eq!(transfer.traits.len(), 2);
        assert!(transfer.traits.iter().all(|(n, _)| n != "wing_span"));
        assert!(transfer.success.is_none());
        assert!(transfer.target_agent.is_none());
    }

    #[test]
    fn initiate_with_no_known_traits_fails() {
        let source = StubAgent::new("donor", "a");
        assert!(initiate(&source, &ColonyId::new("b"), &["wing_span"], 42).is_none());
        assert!(initiate(&source, &ColonyId::new("b"), &[], 42).is_none());
    }

    #[test]
    fn applied_numeric_trait_lands_in_jitter_band() {
        let source = StubAgent::new("donor", "a");
        {
            let mut profile = source.profile.lock().unwrap();
            profile.mutation_rate = 0.4;
        }
        let transfer = initiate(&source, &ColonyId::new("b"), &["mutation_rate"], 42).unwrap();

        let recipient = StubAgent::new("recipient", "b");
        assert!(apply(&recipient, &transfer, 7));

        let landed = recipient.profile().mutation_rate;
        assert!(
            (0.9 * 0.4..=1.1 * 0.4).contains(&landed),
            "perturbed value out of band: {}",
            landed
        );
    }

    #[test]
    fn text_traits_copy_verbatim() {
        let source =
            StubAgent::new("donor", "a").with_trait("dialect", TraitValue::Text("ast".into()));
        let transfer = initiate(&source, &ColonyId::new("b"), &["dialect"], 42).unwrap();

        let recipient =
            StubAgent::new("recipient", "b").with_trait("dialect", TraitValue::Text("tokens".into()));
        assert!(apply(&recipient, &transfer, 7));
    }

    #[test]
    fn traits_absent_on_recipient_are_skipped() {
        let source =
            StubAgent::new("donor", "a").with_trait("dialect", TraitValue::Text("ast".into()));
        let transfer = initiate(
            &source,
            &ColonyId::new("b"),
            &["dialect", "mutation_rate"],
            42,
        )
        .unwrap();
        assert_eq!(transfer.traits.len(), 2);

        // Recipient carries only the profile traits, not "dialect" —
        // partial application still succeeds
        let recipient = StubAgent::new("recipient", "b");
        assert!(apply(&recipient, &transfer, 7));
    }
}
