//! Migration pipeline — multi-stage transfer of an agent between colonies.
//!
//! An admitted migration moves through `Queued → Quarantined →
//! Integrated`, or ends `Failed`. Packets are built at admission time and
//! immutable afterwards; only the surrounding record's status advances.
//! Denied requests never enter the history.

use crate::admission;
use crate::config::EcosystemConfig;
use crate::state::EcosystemState;
use plasmid_core::agent::{ColonyHost, MigrantSeed, MigratableAgent};
use plasmid_core::error::{EcosystemError, Result};
use plasmid_core::types::{AgentId, ColonyId, GeneticProfile, KnowledgeItem, MemorySnapshot, MigrationId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Immutable record of one admitted migration attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPacket {
    pub migration_id: MigrationId,
    pub agent_id: AgentId,
    pub source_colony: ColonyId,
    pub target_colony: ColonyId,
    pub genetic_profile: GeneticProfile,
    pub memory_snapshot: MemorySnapshot,
    pub knowledge_excerpt: Vec<KnowledgeItem>,
    pub timestamp_ms: u64,
    /// Free-text cause recorded at request time.
    pub reason: String,
}

/// Where a migration attempt currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrationStatus {
    /// Admitted and waiting for the coordinator to pick it up.
    Queued,
    /// Held back for the configured quarantine period.
    Quarantined,
    /// Migrant constructed and started in the target colony. Terminal.
    Integrated,
    /// Integration failed; the cause is kept for the audit trail. Terminal.
    Failed(String),
}

/// A packet with its live status, as stored in the migration history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub packet: MigrationPacket,
    pub status: MigrationStatus,
}

impl MigrationRecord {
    pub fn queued(packet: MigrationPacket) -> Self {
        Self {
            packet,
            status: MigrationStatus::Queued,
        }
    }
}

/// Evaluate admission for an agent and, when admitted, append a `Queued`
/// record to the history and return the packet for enqueueing.
///
/// The caller must hold the ecosystem lock across this entire call so
/// that the rate-limit count and the history append are one atomic step.
/// On admission the caller is responsible for terminating the source
/// agent and handing the packet to the coordinator queue.
pub fn initiate(
    state: &mut EcosystemState,
    config: &EcosystemConfig,
    agent: &dyn MigratableAgent,
    target: &ColonyId,
    reason: &str,
    now_ms: u64,
) -> Option<MigrationPacket> {
    let source = agent.colony_id();
    let verdict = admission::evaluate(
        &state.registry,
        &state.migration_history,
        config,
        &source,
        target,
        agent.health(),
        now_ms,
    );
    if !verdict.allowed {
        info!(
            agent = %agent.agent_id(),
            source = %source,
            target = %target,
            reason = %verdict.reason,
            "migration denied"
        );
        return None;
    }

    let mut knowledge = agent.colony_knowledge();
    if knowledge.len() > config.knowledge_excerpt_cap {
        let excess = knowledge.len() - config.knowledge_excerpt_cap;
        knowledge.drain(..excess);
    }

    let packet = MigrationPacket {
        migration_id: MigrationId::new(),
        agent_id: agent.agent_id(),
        source_colony: source,
        target_colony: target.clone(),
        genetic_profile: agent.genetic_profile(),
        memory_snapshot: agent.memory_snapshot().truncated(config.memory_excerpt_cap),
        knowledge_excerpt: knowledge,
        timestamp_ms: now_ms,
        reason: reason.to_string(),
    };

    state
        .migration_history
        .push(MigrationRecord::queued(packet.clone()));
    state.total_migrations += 1;
    Some(packet)
}

/// Prepare the target-side identity and payload for a packet: derive the
/// migrant identity, advance the generation, and tag each knowledge
/// excerpt with the colony it came from.
pub fn prepare_migrant(packet: &MigrationPacket) -> MigrantSeed {
    let mut profile = packet.genetic_profile.clone();
    profile.generation += 1;

    let knowledge = packet
        .knowledge_excerpt
        .iter()
        .map(|item| KnowledgeItem {
            source_colony: Some(packet.source_colony.clone()),
            ..item.clone()
        })
        .collect();

    MigrantSeed {
        agent_id: packet.agent_id.migrant(),
        profile,
        memory: packet.memory_snapshot.clone(),
        knowledge,
    }
}

/// Construct and start the migrant in the target colony.
///
/// The migrant's tagged knowledge is merged into the ecosystem knowledge
/// ring and the target's population estimate is bumped; authoritative
/// population numbers still come from colony stat reports.
pub fn integrate(
    state: &mut EcosystemState,
    host: &dyn ColonyHost,
    packet: &MigrationPacket,
) -> Result<AgentId> {
    let location = state
        .registry
        .lookup(&packet.target_colony)
        .map(|info| info.location.clone())
        .ok_or_else(|| EcosystemError::ColonyNotFound(packet.target_colony.clone()))?;

    let seed = prepare_migrant(packet);
    let mut handle = host.instantiate(&location, &seed)?;
    handle.start()?;

    for item in &seed.knowledge {
        state.record_knowledge(item.clone());
    }
    if let Some(info) = state.registry.get_mut(&packet.target_colony) {
        info.population += 1;
    }

    Ok(seed.agent_id)
}
