//! # Plasmid Core
//!
//! Shared vocabulary for the plasmid ecosystem: identifier newtypes, the
//! genetic data model carried by migrating agents, the capability traits
//! agents and colony hosts implement, and the crate-wide error type.

pub mod agent;
pub mod error;
pub mod types;

pub mod prelude;
