use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kameo::actor::Spawn;
use tokio::sync::broadcast;

use fleetprobe_core::*;
use fleetprobe_exec::{CommandOutput, CommandRunner, TransportError};
use fleetprobe_model::{ComponentState, Uri};

// Mock implementations
struct MockRunner {
    stdout: String,
    status: i32,
    fail: bool,
}

impl MockRunner {
    fn payload(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            status: 0,
            fail: false,
        }
    }

    fn unreachable() -> Self {
        Self {
            stdout: String::new(),
            status: 0,
            fail: true,
        }
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, _cmd: &str) -> Result<CommandOutput, TransportError> {
        if self.fail {
            return Err(TransportError::ConnectionFailed(
                "connection refused".to_string(),
            ));
        }
        Ok(CommandOutput {
            status: self.status,
            stdout: self.stdout.clone(),
            stderr: String::new(),
            duration: Duration::from_millis(1),
        })
    }

    async fn run_with_timeout(
        &self,
        cmd: &str,
        _timeout: Duration,
    ) -> Result<CommandOutput, TransportError> {
        self.run(cmd).await
    }

    fn runner_kind(&self) -> &'static str {
        "mock"
    }
}

/// Factory serving a canned payload per target, keyed by target name
struct TestRunnerFactory;

const WEB01_PAYLOAD: &str = r#"{
    "hostname": "web01",
    "services": {
        "frontend": { "state": "up", "needs": ["service://web01/backend"] },
        "backend": { "state": "up", "needs": [] }
    },
    "current_artefacts": ["frontend/2.1-3"]
}"#;

#[async_trait]
impl RunnerFactory for TestRunnerFactory {
    async fn create_runner(
        &self,
        config: &TargetConfig,
    ) -> Result<Arc<dyn CommandRunner>, CoreError> {
        match config.name.as_str() {
            "web01" => Ok(Arc::new(MockRunner::payload(WEB01_PAYLOAD))),
            "db01" => Ok(Arc::new(MockRunner::unreachable())),
            other => Err(CoreError::ConfigError(format!("unknown target {other}"))),
        }
    }
}

fn target(name: &str) -> TargetConfig {
    TargetConfig {
        name: name.to_string(),
        addr: "127.0.0.1".to_string(),
        user: "root".to_string(),
        port: 22,
        ssh_key: None,
        ssh_key_env: None,
        tags: vec![],
    }
}

fn host_args(name: &str, runner: Arc<dyn CommandRunner>) -> HostActorArgs {
    let (tx, _rx) = broadcast::channel(100);
    HostActorArgs {
        config: target(name),
        runner,
        status_command: "fleet-status --json".to_string(),
        timeout: Duration::from_secs(5),
        event_tx: tx,
    }
}

fn orchestrator_args() -> OrchestratorActorArgs {
    let (tx, _rx) = broadcast::channel(100);
    OrchestratorActorArgs {
        event_tx: tx,
        runner_factory: Arc::new(TestRunnerFactory),
        poller: PollerConfig::default(),
        probes: vec![],
    }
}

#[tokio::test]
async fn test_host_actor_poll_reachable() {
    let args = host_args("web01", Arc::new(MockRunner::payload(WEB01_PAYLOAD)));
    let actor_ref = HostActor::spawn(args);

    let report = actor_ref.ask(PollStatus).await.unwrap();

    assert!(report.reachable);
    assert_eq!(report.state, ComponentState::Up);
    let payload = report.payload.unwrap();
    assert_eq!(payload.hostname, "web01");
    assert_eq!(payload.services.len(), 2);

    let state = actor_ref.ask(GetTargetState).await.unwrap();
    assert_eq!(state, TargetState::Reachable);

    actor_ref.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_host_actor_poll_unreachable() {
    let args = host_args("db01", Arc::new(MockRunner::unreachable()));
    let actor_ref = HostActor::spawn(args);

    let report = actor_ref.ask(PollStatus).await.unwrap();

    assert!(!report.reachable);
    assert_eq!(report.state, ComponentState::Unknown);
    assert!(report.payload.is_none());
    assert!(report.error.unwrap().contains("connection refused"));

    let state = actor_ref.ask(GetTargetState).await.unwrap();
    assert_eq!(state, TargetState::Unreachable);

    actor_ref.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_host_actor_poll_bad_payload_is_unreachable() {
    let args = host_args("web01", Arc::new(MockRunner::payload("{{{ not a payload")));
    let actor_ref = HostActor::spawn(args);

    let report = actor_ref.ask(PollStatus).await.unwrap();

    assert!(!report.reachable);
    assert!(report.error.unwrap().contains("unparseable"));

    actor_ref.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_orchestrator_register_and_list() {
    let orchestrator = OrchestratorActor::spawn(orchestrator_args());

    orchestrator
        .ask(RegisterTarget {
            config: target("web01"),
        })
        .await
        .unwrap();

    let targets = orchestrator.ask(ListTargets).await.unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].name, "web01");
    assert_eq!(targets[0].state, TargetState::Idle);

    orchestrator.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_orchestrator_rejects_duplicate_target() {
    let orchestrator = OrchestratorActor::spawn(orchestrator_args());

    orchestrator
        .ask(RegisterTarget {
            config: target("web01"),
        })
        .await
        .unwrap();

    let result = orchestrator
        .ask(RegisterTarget {
            config: target("web01"),
        })
        .await;

    assert!(matches!(
        result,
        Err(kameo::error::SendError::HandlerError(
            CoreError::TargetAlreadyExists(_)
        ))
    ));

    orchestrator.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_orchestrator_unregister_unknown_target() {
    let orchestrator = OrchestratorActor::spawn(orchestrator_args());

    let result = orchestrator
        .ask(UnregisterTarget {
            name: "ghost".to_string(),
        })
        .await;

    assert!(matches!(
        result,
        Err(kameo::error::SendError::HandlerError(CoreError::TargetNotFound(
            _
        )))
    ));

    orchestrator.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_poll_single_target() {
    let orchestrator = OrchestratorActor::spawn(orchestrator_args());

    orchestrator
        .ask(RegisterTarget {
            config: target("web01"),
        })
        .await
        .unwrap();

    let report = orchestrator
        .ask(PollTarget {
            name: "web01".to_string(),
        })
        .await
        .unwrap();

    assert!(report.reachable);
    assert_eq!(report.target, "web01");

    let result = orchestrator
        .ask(PollTarget {
            name: "ghost".to_string(),
        })
        .await;
    assert!(matches!(
        result,
        Err(kameo::error::SendError::HandlerError(CoreError::TargetNotFound(
            _
        )))
    ));

    orchestrator.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_collect_status_mixed_fleet() {
    let orchestrator = OrchestratorActor::spawn(orchestrator_args());

    for name in ["web01", "db01"] {
        orchestrator
            .ask(RegisterTarget {
                config: target(name),
            })
            .await
            .unwrap();
    }

    let status = orchestrator.ask(CollectStatus).await.unwrap();

    assert_eq!(status.reports.len(), 2);
    assert_eq!(status.reachable, 1);
    assert_eq!(status.unreachable, 1);

    // web01: host + 2 services + 1 artefact; db01: unknown host only
    assert_eq!(status.pool.len(), 5);
    assert_eq!(
        status.pool[&Uri::host("db01")].state(),
        ComponentState::Unknown
    );

    // Graph linked: frontend needs backend and (implicitly) its host
    let frontend = &status.pool[&Uri::service("web01", "frontend")];
    assert!(frontend.needs().contains(&Uri::service("web01", "backend")));
    assert!(frontend.needs().contains(&Uri::host("web01")));

    let backend = &status.pool[&Uri::service("web01", "backend")];
    assert!(
        backend
            .needed_by()
            .contains(&Uri::service("web01", "frontend"))
    );

    // Host supports both services transitively
    assert_eq!(status.pool[&Uri::host("web01")].dependency_score(), 2);

    let summary = status.summary();
    assert_eq!(summary.targets, 2);
    assert_eq!(summary.components, 5);

    orchestrator.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_collect_status_runs_configured_probes() {
    let (tx, _rx) = broadcast::channel(100);
    let args = OrchestratorActorArgs {
        event_tx: tx,
        runner_factory: Arc::new(TestRunnerFactory),
        poller: PollerConfig::default(),
        // lb01 is not a target and appears in no payload; only the
        // probe knows about it.
        probes: vec![ProbeConfig {
            service: "service://lb01/vip".to_string(),
            command: "true".to_string(),
            timeout_secs: None,
        }],
    };
    let orchestrator = OrchestratorActor::spawn(args);

    orchestrator
        .ask(RegisterTarget {
            config: target("web01"),
        })
        .await
        .unwrap();

    let status = orchestrator.ask(CollectStatus).await.unwrap();

    // The probed service made it into the pool with the probe verdict
    let vip = &status.pool[&Uri::service("lb01", "vip")];
    assert_eq!(vip.state(), ComponentState::Up);

    // Probes run before assembly, so the service is linked like any
    // payload service: its host materialises as a placeholder that
    // carries the back-edge and the score.
    assert!(vip.needs().contains(&Uri::host("lb01")));
    let placeholder = &status.pool[&Uri::host("lb01")];
    assert_eq!(placeholder.state(), ComponentState::Missing);
    assert!(placeholder.needed_by().contains(&Uri::service("lb01", "vip")));
    assert_eq!(placeholder.dependency_score(), 1);
    assert_eq!(vip.dependency_score(), 0);

    orchestrator.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_collect_status_emits_events() {
    let (tx, mut rx) = broadcast::channel(100);
    let args = OrchestratorActorArgs {
        event_tx: tx,
        runner_factory: Arc::new(TestRunnerFactory),
        poller: PollerConfig::default(),
        probes: vec![],
    };
    let orchestrator = OrchestratorActor::spawn(args);

    orchestrator
        .ask(RegisterTarget {
            config: target("web01"),
        })
        .await
        .unwrap();

    orchestrator.ask(CollectStatus).await.unwrap();

    let mut saw_polled = false;
    let mut saw_collected = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            fleetprobe_api::events::StatusEvent::TargetPolled { reachable, .. } => {
                assert!(reachable);
                saw_polled = true;
            }
            fleetprobe_api::events::StatusEvent::StatusCollected {
                targets, reachable, ..
            } => {
                assert_eq!(targets, 1);
                assert_eq!(reachable, 1);
                saw_collected = true;
            }
            _ => {}
        }
    }
    assert!(saw_polled);
    assert!(saw_collected);

    orchestrator.stop_gracefully().await.unwrap();
}
