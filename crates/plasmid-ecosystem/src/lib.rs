//! # Plasmid Ecosystem
//!
//! Colony coordination and migration protocol: tracks colony membership,
//! gates agent movement through admission control, executes admitted
//! moves as an asynchronous multi-stage transaction with a quarantine
//! delay, shares genetic traits between colonies without relocation, and
//! derives ecosystem-wide health analytics.

pub mod admission;
pub mod analyzer;
pub mod config;
pub mod coordinator;
pub mod gene_transfer;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod state;

pub mod prelude;
