//! fleetprobe-model: fleet component model
//!
//! Typed URIs, host/service/artefact components, status payload parsing
//! and the dependency graph assembler that links `needs`/`needed_by`
//! edges and computes dependency scores.

pub mod component;
pub mod error;
pub mod graph;
pub mod payload;
pub mod state;
pub mod uri;

pub use component::{Artefact, Component, ComponentPool, Host, MissingComponent, Service};
pub use error::ModelError;
pub use payload::{ServiceEntry, StatusPayload, parse_artefact_spec};
pub use state::ComponentState;
pub use uri::Uri;
