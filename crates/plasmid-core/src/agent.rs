//! Capability traits for agents that can move between colonies.
//!
//! Migration is grafted onto agents through composition, not inheritance:
//! any agent implementation that satisfies `MigratableAgent` can be
//! relocated by a coordinator it is handed to explicitly. The coordinator
//! never reaches into an agent's internals; everything it needs crosses
//! these narrow interfaces.

use crate::error::Result;
use crate::types::{
    AgentId, ColonyId, GeneticProfile, KnowledgeItem, MemorySnapshot, TraitValue,
};
use std::sync::Arc;

/// An agent eligible for migration and gene transfer.
///
/// Implementations are shared across threads (the coordinator applies
/// gene transfers from its background worker), so mutating methods take
/// `&self` and rely on interior mutability.
pub trait MigratableAgent: Send + Sync {
    fn agent_id(&self) -> AgentId;

    /// The colony this agent currently belongs to.
    fn colony_id(&self) -> ColonyId;

    /// Current health of the agent (0-100).
    fn health(&self) -> f64;

    fn genetic_profile(&self) -> GeneticProfile;

    /// The agent's working memory. Implementations may return the full
    /// history; the migration pipeline caps each list before packing.
    fn memory_snapshot(&self) -> MemorySnapshot;

    /// Shared knowledge items the agent carries, oldest first.
    fn colony_knowledge(&self) -> Vec<KnowledgeItem>;

    /// Look up a named trait. Unknown names yield `None`.
    fn trait_value(&self, name: &str) -> Option<TraitValue>;

    /// Apply a trait value. Returns false when the agent does not carry
    /// the trait.
    fn set_trait_value(&self, name: &str, value: TraitValue) -> bool;

    /// Source-side apoptosis: the agent enters its terminal state and
    /// stops producing work. Called once when a migration is admitted.
    fn terminate(&self, reason: &str);
}

/// Handle to a freshly constructed migrant that is not yet running.
pub trait AgentHandle: Send {
    fn agent_id(&self) -> AgentId;

    /// Bring the migrant to life in its new colony.
    fn start(&mut self) -> Result<()>;
}

/// A migrant fully prepared for target-side construction: identity
/// already suffixed, generation already incremented, knowledge already
/// tagged with its colony of origin.
#[derive(Debug, Clone)]
pub struct MigrantSeed {
    pub agent_id: AgentId,
    pub profile: GeneticProfile,
    pub memory: MemorySnapshot,
    pub knowledge: Vec<KnowledgeItem>,
}

/// Host-side hooks the coordinator uses to construct migrants and
/// resolve gene-transfer recipients inside a colony.
pub trait ColonyHost: Send + Sync {
    /// Instantiate a migrant at the colony's location. The returned
    /// handle must be `start()`ed before the migrant counts as live.
    fn instantiate(&self, location: &str, seed: &MigrantSeed) -> Result<Box<dyn AgentHandle>>;

    /// Pick a recipient for an incoming gene transfer, if the colony has
    /// any agent willing to receive one.
    fn select_recipient(&self, colony: &ColonyId) -> Option<Arc<dyn MigratableAgent>>;
}
