//! Error types for ecosystem operations.

use crate::types::{AgentId, ColonyId};
use thiserror::Error;

/// Errors that can occur during ecosystem coordination.
#[derive(Error, Debug, Clone)]
pub enum EcosystemError {
    #[error("Colony not found: {0}")]
    ColonyNotFound(ColonyId),

    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Colony host unavailable: {0}")]
    HostUnavailable(String),

    #[error("Migrant integration failed: {0}")]
    Integration(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for EcosystemError {
    fn from(e: std::io::Error) -> Self {
        EcosystemError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for EcosystemError {
    fn from(e: serde_json::Error) -> Self {
        EcosystemError::Serialization(e.to_string())
    }
}

/// Result type for ecosystem operations.
pub type Result<T> = std::result::Result<T, EcosystemError>;
