//! Poll state machine for a target

use kameo_macros::Reply;

/// States of a `HostActor` poll cycle
///
/// Idle -> Polling on the first poll; Polling settles into Reachable or
/// Unreachable, and either settled state may re-enter Polling on the
/// next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reply)]
pub enum TargetState {
    Idle,
    Polling,
    Reachable,
    Unreachable,
}

impl TargetState {
    /// Whether the transition to `next` is legal
    #[must_use]
    pub fn can_transition_to(self, next: TargetState) -> bool {
        matches!(
            (self, next),
            (TargetState::Idle, TargetState::Polling)
                | (TargetState::Reachable, TargetState::Polling)
                | (TargetState::Unreachable, TargetState::Polling)
                | (TargetState::Polling, TargetState::Reachable)
                | (TargetState::Polling, TargetState::Unreachable)
        )
    }

    /// Whether a poll is currently in flight
    #[must_use]
    pub fn is_busy(self) -> bool {
        self == TargetState::Polling
    }
}

impl std::fmt::Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetState::Idle => write!(f, "idle"),
            TargetState::Polling => write!(f, "polling"),
            TargetState::Reachable => write!(f, "reachable"),
            TargetState::Unreachable => write!(f, "unreachable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(TargetState::Idle.can_transition_to(TargetState::Polling));
        assert!(TargetState::Polling.can_transition_to(TargetState::Reachable));
        assert!(TargetState::Polling.can_transition_to(TargetState::Unreachable));
        assert!(TargetState::Reachable.can_transition_to(TargetState::Polling));
        assert!(TargetState::Unreachable.can_transition_to(TargetState::Polling));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!TargetState::Idle.can_transition_to(TargetState::Reachable));
        assert!(!TargetState::Idle.can_transition_to(TargetState::Unreachable));
        assert!(!TargetState::Polling.can_transition_to(TargetState::Polling));
        assert!(!TargetState::Reachable.can_transition_to(TargetState::Unreachable));
    }

    #[test]
    fn test_busy() {
        assert!(TargetState::Polling.is_busy());
        assert!(!TargetState::Reachable.is_busy());
    }
}
