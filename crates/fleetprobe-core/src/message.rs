//! Message types for actor communication
//!
//! Message handlers are implemented in their respective actor modules.

use std::time::Duration;

use chrono::{DateTime, Utc};
use kameo_macros::Reply;

use fleetprobe_api::summary::RunSummary;
use fleetprobe_model::{ComponentPool, ComponentState, StatusPayload};

use crate::config::TargetConfig;
use crate::state::TargetState;

// ============================================================================
// HostActor Messages
// ============================================================================

/// Run the status-query command against the target
#[derive(Debug)]
pub struct PollStatus;

/// Outcome of polling one target
///
/// Poll failures are data, not errors: an unreachable target produces a
/// report with `reachable = false` and a populated `error`.
#[derive(Debug, Clone, Reply)]
pub struct HostReport {
    /// Target name
    pub target: String,
    /// Observed host state (`Up` when reachable, `Unknown` otherwise)
    pub state: ComponentState,
    /// Whether the status query succeeded
    pub reachable: bool,
    /// Parsed payload (absent when unreachable)
    pub payload: Option<StatusPayload>,
    /// Failure detail when unreachable
    pub error: Option<String>,
    /// When the poll started
    pub polled_at: DateTime<Utc>,
    /// How long the poll took
    pub duration: Duration,
}

impl HostReport {
    /// A report for a target that could not be polled
    #[must_use]
    pub fn unreachable(target: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            state: ComponentState::Unknown,
            reachable: false,
            payload: None,
            error: Some(error.into()),
            polled_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }
}

/// Get the current poll state
#[derive(Debug)]
pub struct GetTargetState;

/// Get the full target status
#[derive(Debug)]
pub struct GetTargetStatus;

/// Target status response
#[derive(Debug, Clone, Reply)]
pub struct TargetStatus {
    /// Target name
    pub name: String,
    /// Address polled over SSH
    pub addr: String,
    /// Current poll state
    pub state: TargetState,
    /// When the target was last polled successfully
    pub last_polled: Option<DateTime<Utc>>,
    /// Error from the last poll, if it failed
    pub error: Option<String>,
    /// Tags assigned to the target
    pub tags: Vec<String>,
}

// ============================================================================
// OrchestratorActor Messages
// ============================================================================

/// Register a new target with the orchestrator
#[derive(Debug)]
pub struct RegisterTarget {
    /// Target configuration
    pub config: TargetConfig,
}

/// Unregister a target from the orchestrator
#[derive(Debug)]
pub struct UnregisterTarget {
    /// Target name to remove
    pub name: String,
}

/// List all registered targets
#[derive(Debug)]
pub struct ListTargets;

/// Poll a single target by name
#[derive(Debug)]
pub struct PollTarget {
    /// Target name to poll
    pub name: String,
}

/// Collect status across the whole fleet: fan out polls, build the
/// component pool, apply local probes, assemble the dependency graph
#[derive(Debug)]
pub struct CollectStatus;

/// Assembled result of a fleet status run
#[derive(Debug, Clone, Reply)]
pub struct FleetStatus {
    /// The linked, scored component pool
    pub pool: ComponentPool,
    /// Per-target poll reports
    pub reports: Vec<HostReport>,
    /// Targets that answered
    pub reachable: usize,
    /// Targets that did not answer
    pub unreachable: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

impl FleetStatus {
    /// Condense into the wire summary type
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            targets: self.reports.len(),
            reachable: self.reachable,
            unreachable: self.unreachable,
            components: self.pool.len(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}
