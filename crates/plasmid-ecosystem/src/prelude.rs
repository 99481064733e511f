//! Plasmid Ecosystem Prelude — convenient imports for common usage.
//!
//! ```rust
//! use plasmid_ecosystem::prelude::*;
//! ```

pub use crate::admission::AdmissionVerdict;
pub use crate::analyzer::{EcosystemHealthReport, EcosystemStatus};
pub use crate::config::EcosystemConfig;
pub use crate::coordinator::EcosystemCoordinator;
pub use crate::gene_transfer::GeneTransfer;
pub use crate::pipeline::{MigrationPacket, MigrationRecord, MigrationStatus};
pub use crate::registry::{ColonyInfo, ColonyRegistry};
pub use crate::session::{load_ecosystem, restore_into_state, save_ecosystem, EcosystemSnapshot};
pub use crate::state::EcosystemState;

pub use plasmid_core::prelude::*;
