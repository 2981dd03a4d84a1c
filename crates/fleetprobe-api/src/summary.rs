//! Summary types for status runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One configured target as listed by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSummary {
    /// Target name
    pub name: String,
    /// Address polled over SSH
    pub addr: String,
    /// Current poll state ("idle", "polling", "reachable", "unreachable")
    pub state: String,
    /// Tags assigned to the target
    pub tags: Vec<String>,
    /// When the target was last polled successfully
    pub last_polled: Option<DateTime<Utc>>,
}

/// Aggregate result of one fleet status run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of targets polled
    pub targets: usize,
    /// Targets that answered the status query
    pub reachable: usize,
    /// Targets that did not answer
    pub unreachable: usize,
    /// Total components in the assembled pool
    pub components: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}
