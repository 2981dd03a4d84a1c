//! Component state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Observed state of a fleet component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    /// Component is running / present
    Up,
    /// Component is stopped / absent
    Down,
    /// State could not be determined (unreachable host, failed probe)
    Unknown,
    /// Component only exists as the target of a dependency edge
    Missing,
}

impl ComponentState {
    /// Map a state string from a status payload
    ///
    /// Unrecognised strings map to `Unknown` rather than failing the
    /// whole payload.
    #[must_use]
    pub fn from_report(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" | "running" => ComponentState::Up,
            "down" | "stopped" => ComponentState::Down,
            _ => ComponentState::Unknown,
        }
    }

    /// Whether the component is known to be running
    #[must_use]
    pub fn is_up(&self) -> bool {
        matches!(self, ComponentState::Up)
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentState::Up => write!(f, "up"),
            ComponentState::Down => write!(f, "down"),
            ComponentState::Unknown => write!(f, "unknown"),
            ComponentState::Missing => write!(f, "missing"),
        }
    }
}
