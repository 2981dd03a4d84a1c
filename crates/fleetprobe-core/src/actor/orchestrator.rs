//! `OrchestratorActor`: fleet-wide status collection
//!
//! Manages the registry of `HostActors` and runs the full pipeline:
//! batched poll fan-out, component building, local probes, graph
//! assembly.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use fleetprobe_api::events::StatusEvent;
use fleetprobe_exec::{CommandRunner, LocalRunner};
use fleetprobe_model::graph;

use crate::actor::host::{HostActor, HostActorArgs};
use crate::build::build_components;
use crate::config::{PollerConfig, ProbeConfig, TargetConfig};
use crate::error::CoreError;
use crate::message::{
    CollectStatus, FleetStatus, GetTargetStatus, HostReport, ListTargets, PollStatus, PollTarget,
    RegisterTarget, TargetStatus, UnregisterTarget,
};
use crate::probe::ServiceProber;

/// Factory trait for creating `HostActor` command runners
///
/// Allows injection of different transports per target (SSH for remote
/// targets, local execution for the controller itself, mocks in tests).
#[async_trait::async_trait]
pub trait RunnerFactory: Send + Sync {
    /// Create a command runner for the given target config
    async fn create_runner(
        &self,
        config: &TargetConfig,
    ) -> Result<Arc<dyn CommandRunner>, CoreError>;

    /// Create the runner local probes execute on
    async fn create_probe_runner(&self) -> Arc<dyn CommandRunner> {
        Arc::new(LocalRunner::new())
    }
}

/// Arguments for spawning an `OrchestratorActor`
pub struct OrchestratorActorArgs {
    /// Event broadcast sender; created by the caller so subscribers can
    /// attach before the first target registers
    pub event_tx: broadcast::Sender<StatusEvent>,
    /// Factory for creating target runners
    pub runner_factory: Arc<dyn RunnerFactory>,
    /// Poller settings
    pub poller: PollerConfig,
    /// Local probes applied after each collection
    pub probes: Vec<ProbeConfig>,
}

/// Fleet orchestrator managing all target actors
pub struct OrchestratorActor {
    /// Registry of target actors by name
    targets: HashMap<String, ActorRef<HostActor>>,
    /// Target configurations
    configs: HashMap<String, TargetConfig>,
    /// Event broadcast sender
    event_tx: broadcast::Sender<StatusEvent>,
    /// Factory for creating target runners
    runner_factory: Arc<dyn RunnerFactory>,
    /// Poller settings
    poller: PollerConfig,
    /// Local probes applied after each collection
    probes: Vec<ProbeConfig>,
}

impl OrchestratorActor {
    /// Get an event receiver for bus forwarding
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.event_tx.subscribe()
    }

    /// Get number of registered targets
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Spawn a `HostActor` for the given config
    async fn spawn_target_actor(
        &mut self,
        config: TargetConfig,
    ) -> Result<ActorRef<HostActor>, CoreError> {
        let runner = self.runner_factory.create_runner(&config).await?;
        let transport = runner.runner_kind();

        let args = HostActorArgs {
            config: config.clone(),
            runner,
            status_command: self.poller.status_command.clone(),
            timeout: self.poller.timeout(),
            event_tx: self.event_tx.clone(),
        };

        let actor_ref = HostActor::spawn(args);

        info!(target = %config.name, transport, "spawned HostActor");

        Ok(actor_ref)
    }
}

impl Actor for OrchestratorActor {
    type Args = OrchestratorActorArgs;
    type Error = CoreError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!(id = %actor_ref.id(), "OrchestratorActor starting");

        Ok(Self {
            targets: HashMap::new(),
            configs: HashMap::new(),
            event_tx: args.event_tx,
            runner_factory: args.runner_factory,
            poller: args.poller,
            probes: args.probes,
        })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!(reason = ?reason, "OrchestratorActor stopping");

        for (name, actor_ref) in &self.targets {
            info!(target = %name, "stopping HostActor");
            actor_ref.stop_gracefully().await.ok();
        }

        Ok(())
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<RegisterTarget> for OrchestratorActor {
    type Reply = Result<(), CoreError>;

    async fn handle(
        &mut self,
        msg: RegisterTarget,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let name = msg.config.name.clone();

        if self.targets.contains_key(&name) {
            return Err(CoreError::TargetAlreadyExists(name));
        }

        let actor_ref = self.spawn_target_actor(msg.config.clone()).await?;
        self.targets.insert(name.clone(), actor_ref);
        self.configs.insert(name, msg.config);

        Ok(())
    }
}

impl Message<UnregisterTarget> for OrchestratorActor {
    type Reply = Result<(), CoreError>;

    async fn handle(
        &mut self,
        msg: UnregisterTarget,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let name = &msg.name;

        if let Some(actor_ref) = self.targets.remove(name) {
            self.configs.remove(name);
            actor_ref.stop_gracefully().await.ok();
            info!(target = %name, "unregistered target");
            Ok(())
        } else {
            Err(CoreError::TargetNotFound(name.clone()))
        }
    }
}

impl Message<ListTargets> for OrchestratorActor {
    type Reply = Vec<TargetStatus>;

    async fn handle(
        &mut self,
        _msg: ListTargets,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let mut statuses = Vec::with_capacity(self.targets.len());

        for (name, actor_ref) in &self.targets {
            match actor_ref.ask(GetTargetStatus).await {
                Ok(status) => statuses.push(status),
                Err(e) => {
                    warn!(target = %name, error = %e, "failed to get target status");
                }
            }
        }

        statuses.sort_by(|a, b| a.name.cmp(&b.name));

        statuses
    }
}

impl Message<PollTarget> for OrchestratorActor {
    type Reply = Result<HostReport, CoreError>;

    async fn handle(
        &mut self,
        msg: PollTarget,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let actor_ref = self
            .targets
            .get(&msg.name)
            .ok_or_else(|| CoreError::TargetNotFound(msg.name.clone()))?;

        match actor_ref.ask(PollStatus).await {
            Ok(inner_result) => Ok(inner_result),
            Err(e) => Err(CoreError::ActorError(e.to_string())),
        }
    }
}

impl Message<CollectStatus> for OrchestratorActor {
    type Reply = Result<FleetStatus, CoreError>;

    async fn handle(
        &mut self,
        _msg: CollectStatus,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let started_at = Utc::now();

        // Sorted target order keeps report output deterministic
        let mut to_poll: Vec<_> = self
            .targets
            .iter()
            .map(|(name, actor)| (name.clone(), actor.clone()))
            .collect();
        to_poll.sort_by(|a, b| a.0.cmp(&b.0));

        let total = to_poll.len();
        let mut reports = Vec::with_capacity(total);

        info!(
            targets = total,
            batch_size = self.poller.batch_size,
            "starting fleet status collection"
        );

        for batch in to_poll.chunks(self.poller.batch_size.max(1)) {
            let mut handles = Vec::new();

            for (name, actor_ref) in batch {
                let actor = actor_ref.clone();
                let target_name = name.clone();

                let handle = tokio::spawn(async move { actor.ask(PollStatus).await });

                handles.push((target_name, handle));
            }

            for (name, handle) in handles {
                match handle.await {
                    Ok(Ok(report)) => reports.push(report),
                    Ok(Err(e)) => {
                        error!(target = %name, error = %e, "poll failed");
                        reports.push(HostReport::unreachable(&name, e.to_string()));
                    }
                    Err(e) => {
                        error!(target = %name, error = %e, "poll task panicked");
                        reports.push(HostReport::unreachable(&name, e.to_string()));
                    }
                }
            }
        }

        let reachable = reports.iter().filter(|r| r.reachable).count();
        let unreachable = total - reachable;

        let mut pool = build_components(&reports);

        // Probes run before linking so inserted services get edges too
        if !self.probes.is_empty() {
            let runner = self.runner_factory.create_probe_runner().await;
            let prober = ServiceProber::new(runner, self.probes.clone());
            prober.apply(&mut pool).await;
        }

        graph::assemble(&mut pool);

        let finished_at = Utc::now();

        info!(
            targets = total,
            reachable,
            unreachable,
            components = pool.len(),
            "fleet status collection finished"
        );

        let event = StatusEvent::StatusCollected {
            targets: total,
            reachable,
            unreachable,
        };
        let _ = self.event_tx.send(event);

        Ok(FleetStatus {
            pool,
            reports,
            reachable,
            unreachable,
            started_at,
            finished_at,
        })
    }
}
