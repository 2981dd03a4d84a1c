//! fleetprobe-api: shared wire types
//!
//! Event and summary types exchanged between the collector, the state
//! store and the notification bus.

pub mod events;
pub mod summary;

pub use events::StatusEvent;
pub use summary::{RunSummary, TargetSummary};
