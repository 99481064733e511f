//! Plasmid Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use plasmid_core::prelude::*;
//! ```

pub use crate::agent::{AgentHandle, ColonyHost, MigrantSeed, MigratableAgent};
pub use crate::error::{EcosystemError, Result};
pub use crate::types::{
    now_ms, AgentId, ColonyId, GeneticProfile, KnowledgeItem, MemorySnapshot, MigrationId,
    TraitValue, TransferId,
};
