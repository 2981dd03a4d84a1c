//! Actor implementations

pub mod host;
pub mod orchestrator;
