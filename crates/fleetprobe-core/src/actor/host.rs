//! `HostActor`: per-target status polling
//!
//! Runs the status-query command against one target and turns the
//! outcome into a `HostReport`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use tokio::sync::broadcast;
use tracing::{info, warn};

use fleetprobe_api::events::StatusEvent;
use fleetprobe_exec::CommandRunner;
use fleetprobe_model::{ComponentState, StatusPayload};

use crate::config::TargetConfig;
use crate::error::CoreError;
use crate::message::{GetTargetState, GetTargetStatus, HostReport, PollStatus, TargetStatus};
use crate::state::TargetState;

/// Arguments for spawning a `HostActor`
pub struct HostActorArgs {
    /// Target configuration
    pub config: TargetConfig,
    /// Command runner (SSH or local)
    pub runner: Arc<dyn CommandRunner>,
    /// Remote command that prints the status payload
    pub status_command: String,
    /// Per-poll timeout
    pub timeout: Duration,
    /// Event broadcast sender for the notification bus
    pub event_tx: broadcast::Sender<StatusEvent>,
}

/// Per-target actor managing the poll state machine
pub struct HostActor {
    /// Target configuration
    config: TargetConfig,
    /// Current poll state
    state: TargetState,
    /// Command runner (SSH or local)
    runner: Arc<dyn CommandRunner>,
    /// Remote command that prints the status payload
    status_command: String,
    /// Per-poll timeout
    timeout: Duration,
    /// Event broadcast sender
    event_tx: broadcast::Sender<StatusEvent>,
    /// When the target last answered
    last_polled: Option<DateTime<Utc>>,
    /// Error from the last poll, if it failed
    last_error: Option<String>,
}

impl HostActor {
    /// Get the target name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Get current poll state
    #[must_use]
    pub fn state(&self) -> TargetState {
        self.state
    }

    /// Transition to a new state with validation and event emission
    fn transition_to(&mut self, new_state: TargetState) -> Result<(), CoreError> {
        if !self.state.can_transition_to(new_state) {
            return Err(CoreError::InvalidTransition {
                from: self.state,
                to: new_state,
            });
        }

        let old_state = self.state;
        self.state = new_state;

        info!(
            target = %self.config.name,
            from = %old_state,
            to = %new_state,
            "state transition"
        );

        let event = StatusEvent::TargetStateChanged {
            target: self.config.name.clone(),
            from: old_state.to_string(),
            to: new_state.to_string(),
        };
        // Ignore send errors (no subscribers is fine)
        let _ = self.event_tx.send(event);

        Ok(())
    }

    /// Settle a finished poll into Reachable or Unreachable
    fn settle(&mut self, report: &HostReport) -> Result<(), CoreError> {
        if report.reachable {
            self.last_polled = Some(report.polled_at);
            self.last_error = None;
            self.transition_to(TargetState::Reachable)?;
        } else {
            self.last_error = report.error.clone();
            self.transition_to(TargetState::Unreachable)?;
        }

        #[allow(clippy::cast_possible_truncation)]
        let event = StatusEvent::TargetPolled {
            target: self.config.name.clone(),
            reachable: report.reachable,
            duration_ms: report.duration.as_millis() as u64,
        };
        let _ = self.event_tx.send(event);

        Ok(())
    }
}

impl Actor for HostActor {
    type Args = HostActorArgs;
    type Error = CoreError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!(target = %args.config.name, id = %actor_ref.id(), "HostActor starting");

        let event = StatusEvent::TargetRegistered {
            target: args.config.name.clone(),
        };
        let _ = args.event_tx.send(event);

        Ok(Self {
            config: args.config,
            state: TargetState::Idle,
            runner: args.runner,
            status_command: args.status_command,
            timeout: args.timeout,
            event_tx: args.event_tx,
            last_polled: None,
            last_error: None,
        })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!(
            target = %self.config.name,
            reason = ?reason,
            "HostActor stopping"
        );

        let event = StatusEvent::TargetUnregistered {
            target: self.config.name.clone(),
        };
        let _ = self.event_tx.send(event);

        Ok(())
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<PollStatus> for HostActor {
    type Reply = Result<HostReport, CoreError>;

    async fn handle(
        &mut self,
        _msg: PollStatus,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        if self.state.is_busy() {
            return Err(CoreError::InvalidTransition {
                from: self.state,
                to: TargetState::Polling,
            });
        }

        self.transition_to(TargetState::Polling)?;

        let polled_at = Utc::now();
        let started = std::time::Instant::now();

        // Poll failures are data, not errors: every outcome below yields
        // a report, and only actor-level problems return Err.
        let report = match self
            .runner
            .run_with_timeout(&self.status_command, self.timeout)
            .await
        {
            Ok(output) if output.success() => match StatusPayload::parse(&output.stdout) {
                Ok(payload) => HostReport {
                    target: self.config.name.clone(),
                    state: ComponentState::Up,
                    reachable: true,
                    payload: Some(payload),
                    error: None,
                    polled_at,
                    duration: started.elapsed(),
                },
                Err(e) => {
                    warn!(target = %self.config.name, error = %e, "unparseable status payload");
                    HostReport {
                        duration: started.elapsed(),
                        polled_at,
                        ..HostReport::unreachable(
                            &self.config.name,
                            format!("unparseable status payload: {e}"),
                        )
                    }
                }
            },
            Ok(output) => {
                warn!(
                    target = %self.config.name,
                    status = output.status,
                    output = %output.combined_output().trim(),
                    "status command failed"
                );
                HostReport {
                    duration: started.elapsed(),
                    polled_at,
                    ..HostReport::unreachable(
                        &self.config.name,
                        format!(
                            "status command exited with {}: {}",
                            output.status,
                            output.stderr.trim()
                        ),
                    )
                }
            }
            Err(e) => {
                warn!(
                    target = %self.config.name,
                    error = %e,
                    retryable = e.is_retryable(),
                    "poll transport error"
                );
                HostReport {
                    duration: started.elapsed(),
                    polled_at,
                    ..HostReport::unreachable(&self.config.name, e.to_string())
                }
            }
        };

        self.settle(&report)?;

        Ok(report)
    }
}

impl Message<GetTargetState> for HostActor {
    type Reply = TargetState;

    async fn handle(
        &mut self,
        _msg: GetTargetState,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.state
    }
}

impl Message<GetTargetStatus> for HostActor {
    type Reply = TargetStatus;

    async fn handle(
        &mut self,
        _msg: GetTargetStatus,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        TargetStatus {
            name: self.config.name.clone(),
            addr: self.config.addr.clone(),
            state: self.state,
            last_polled: self.last_polled,
            error: self.last_error.clone(),
            tags: self.config.tags.clone(),
        }
    }
}
