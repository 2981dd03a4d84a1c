//! fleetprobe-core: collection actors and fleet logic
//!
//! Implements the `OrchestratorActor` and per-target `HostActor` using
//! the kameo framework. Contains message types, the poll state machine,
//! the component builder, the local service prober and fan-out logic.

pub mod actor;
pub mod build;
pub mod config;
pub mod error;
pub mod message;
pub mod probe;
pub mod state;

pub use actor::host::{HostActor, HostActorArgs};
pub use actor::orchestrator::{OrchestratorActor, OrchestratorActorArgs, RunnerFactory};
pub use build::build_components;
pub use config::{PollerConfig, ProbeConfig, TargetConfig};
pub use error::CoreError;
pub use message::{
    CollectStatus, FleetStatus, GetTargetState, GetTargetStatus, HostReport, ListTargets,
    PollStatus, PollTarget, RegisterTarget, TargetStatus, UnregisterTarget,
};
pub use probe::ServiceProber;
pub use state::TargetState;
