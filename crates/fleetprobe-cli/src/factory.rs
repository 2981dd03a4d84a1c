//! Runner factory wiring targets to their transport

use std::sync::Arc;

use async_trait::async_trait;

use fleetprobe_core::{CoreError, RunnerFactory, TargetConfig};
use fleetprobe_exec::{CommandRunner, LocalRunner, SshRunnerBuilder};

/// Default implementation of `RunnerFactory`
pub struct DefaultRunnerFactory;

impl DefaultRunnerFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        Self
    }

    fn create_runner_sync(config: &TargetConfig) -> Result<Arc<dyn CommandRunner>, CoreError> {
        // Local execution for the controller itself
        if config.addr == "localhost" || config.addr == "127.0.0.1" {
            return Ok(Arc::new(LocalRunner::new()));
        }

        let mut builder =
            SshRunnerBuilder::new(&config.addr, &config.user).with_port(config.port);

        builder = match (&config.ssh_key, &config.ssh_key_env) {
            (Some(key_path), _) => builder.with_key_path(key_path),
            (None, Some(var)) => builder.with_env_key(var),
            (None, None) => builder.with_agent(),
        };

        let runner = builder.build().map_err(|e| {
            CoreError::ConfigError(format!(
                "failed to create SSH runner for {}: {e}",
                config.name
            ))
        })?;

        Ok(Arc::new(runner))
    }
}

impl Default for DefaultRunnerFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunnerFactory for DefaultRunnerFactory {
    async fn create_runner(
        &self,
        config: &TargetConfig,
    ) -> Result<Arc<dyn CommandRunner>, CoreError> {
        Self::create_runner_sync(config)
    }
}
