//! Notification bus event types

use serde::{Deserialize, Serialize};

/// Events published to the notification bus during a status run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StatusEvent {
    /// A target's poll state machine transitioned
    TargetStateChanged {
        target: String,
        from: String,
        to: String,
    },
    /// A single target poll finished
    TargetPolled {
        target: String,
        reachable: bool,
        duration_ms: u64,
    },
    /// A full fleet collection finished
    StatusCollected {
        targets: usize,
        reachable: usize,
        unreachable: usize,
    },
    /// A target was registered with the collector
    TargetRegistered { target: String },
    /// A target was removed from the collector
    TargetUnregistered { target: String },
}
