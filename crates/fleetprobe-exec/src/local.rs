//! Command execution on the controller host
//!
//! Targets that resolve to the controller itself skip SSH entirely, and
//! the local service prober always runs here. Commands go through
//! `sh -c` so status commands and probe definitions can use pipes and
//! redirections.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::error::TransportError;
use crate::output::CommandOutput;
use crate::traits::CommandRunner;

/// Runs status-query and probe commands on the controller host
#[derive(Debug, Clone, Default)]
pub struct LocalRunner;

impl LocalRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for LocalRunner {
    #[instrument(skip(self), level = "debug")]
    async fn run(&self, cmd: &str) -> Result<CommandOutput, TransportError> {
        let start = Instant::now();

        let output = Command::new("sh")
            .args(["-c", cmd])
            // Reap the child if a timeout drops this future mid-run
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TransportError::SpawnError(e.to_string()))?;

        let result = CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: start.elapsed(),
        };

        if result.success() {
            debug!(command = %cmd, duration = ?result.duration, "local command completed");
        } else {
            // A non-zero exit is normal for probes (service down), so
            // this stays below error level.
            warn!(
                command = %cmd,
                status = result.status,
                stderr = %result.stderr.trim(),
                "local command exited non-zero"
            );
        }

        Ok(result)
    }

    #[instrument(skip(self), level = "debug")]
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout_duration: Duration,
    ) -> Result<CommandOutput, TransportError> {
        timeout(timeout_duration, self.run(cmd)).await.map_err(|_| {
            warn!(command = %cmd, timeout = ?timeout_duration, "local command timed out");
            TransportError::Timeout {
                timeout: timeout_duration,
            }
        })?
    }

    fn runner_kind(&self) -> &'static str {
        "local"
    }
}
