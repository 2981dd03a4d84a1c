//! Fleet components
//!
//! Hosts, services and artefacts built from status payloads, plus the
//! placeholder components the graph assembler materialises for dangling
//! `needs` edges.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::ComponentState;
use crate::uri::Uri;

/// All components of a fleet, keyed by URI (deterministic iteration)
pub type ComponentPool = BTreeMap<Uri, Component>;

/// A fleet target host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    /// Component URI
    pub uri: Uri,
    /// Short host name
    pub name: String,
    /// Fully qualified domain name, when reported
    pub fqdn: Option<String>,
    /// Observed state (`Up` when polled, `Unknown` when unreachable)
    pub state: ComponentState,
    /// Whether the last poll reached the host
    pub reachable: bool,
    /// When the host was last polled
    pub polled_at: DateTime<Utc>,
    /// Components depending on this host (filled by the assembler)
    #[serde(default)]
    pub needed_by: Vec<Uri>,
    /// Number of components transitively depending on this one
    #[serde(default)]
    pub dependency_score: usize,
}

/// A service defined on a host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Component URI
    pub uri: Uri,
    /// Host the service runs on
    pub host: String,
    /// Service name
    pub name: String,
    /// Observed state
    pub state: ComponentState,
    /// Components this service needs (explicit edges from the payload
    /// plus the implicit edge to its host)
    #[serde(default)]
    pub needs: Vec<Uri>,
    /// Components depending on this service
    #[serde(default)]
    pub needed_by: Vec<Uri>,
    /// Number of components transitively depending on this one
    #[serde(default)]
    pub dependency_score: usize,
}

/// A deployable software unit tracked per host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artefact {
    /// Component URI
    pub uri: Uri,
    /// Host the artefact is installed on
    pub host: String,
    /// Artefact name
    pub name: String,
    /// Artefact version
    pub version: Option<String>,
    /// Observed state (`Up` for installed artefacts)
    pub state: ComponentState,
    /// True when this is a pending upgrade target, not an installed unit
    pub pending: bool,
    /// Components depending on this artefact
    #[serde(default)]
    pub needed_by: Vec<Uri>,
    /// Number of components transitively depending on this one
    #[serde(default)]
    pub dependency_score: usize,
}

/// Placeholder for a dependency target no payload materialised
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingComponent {
    /// Component URI
    pub uri: Uri,
    /// Components depending on this placeholder
    #[serde(default)]
    pub needed_by: Vec<Uri>,
    /// Number of components transitively depending on this one
    #[serde(default)]
    pub dependency_score: usize,
}

/// Any component of the fleet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Component {
    Host(Host),
    Service(Service),
    Artefact(Artefact),
    Missing(MissingComponent),
}

impl Component {
    /// Component URI
    #[must_use]
    pub fn uri(&self) -> &Uri {
        match self {
            Component::Host(h) => &h.uri,
            Component::Service(s) => &s.uri,
            Component::Artefact(a) => &a.uri,
            Component::Missing(m) => &m.uri,
        }
    }

    /// Observed state
    #[must_use]
    pub fn state(&self) -> ComponentState {
        match self {
            Component::Host(h) => h.state,
            Component::Service(s) => s.state,
            Component::Artefact(a) => a.state,
            Component::Missing(_) => ComponentState::Missing,
        }
    }

    /// Outgoing dependency edges (only services carry any)
    #[must_use]
    pub fn needs(&self) -> &[Uri] {
        match self {
            Component::Service(s) => &s.needs,
            _ => &[],
        }
    }

    /// Incoming dependency edges
    #[must_use]
    pub fn needed_by(&self) -> &[Uri] {
        match self {
            Component::Host(h) => &h.needed_by,
            Component::Service(s) => &s.needed_by,
            Component::Artefact(a) => &a.needed_by,
            Component::Missing(m) => &m.needed_by,
        }
    }

    pub(crate) fn needed_by_mut(&mut self) -> &mut Vec<Uri> {
        match self {
            Component::Host(h) => &mut h.needed_by,
            Component::Service(s) => &mut s.needed_by,
            Component::Artefact(a) => &mut a.needed_by,
            Component::Missing(m) => &mut m.needed_by,
        }
    }

    /// Number of components transitively depending on this one
    #[must_use]
    pub fn dependency_score(&self) -> usize {
        match self {
            Component::Host(h) => h.dependency_score,
            Component::Service(s) => s.dependency_score,
            Component::Artefact(a) => a.dependency_score,
            Component::Missing(m) => m.dependency_score,
        }
    }

    pub(crate) fn set_dependency_score(&mut self, score: usize) {
        match self {
            Component::Host(h) => h.dependency_score = score,
            Component::Service(s) => s.dependency_score = score,
            Component::Artefact(a) => a.dependency_score = score,
            Component::Missing(m) => m.dependency_score = score,
        }
    }

    /// Update the observed state (used by the local prober)
    pub fn set_state(&mut self, state: ComponentState) {
        match self {
            Component::Host(h) => h.state = state,
            Component::Service(s) => s.state = state,
            Component::Artefact(a) => a.state = state,
            Component::Missing(_) => {}
        }
    }
}
