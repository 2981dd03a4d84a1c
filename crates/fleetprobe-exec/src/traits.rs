//! Command runner trait

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::output::CommandOutput;

/// Abstraction over how a status-query command reaches its target.
///
/// Implementations exist for SSH ([`crate::ssh::SshRunner`]) and the
/// controller host itself ([`crate::local::LocalRunner`]). The poller and
/// the local service prober only ever see this trait.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and capture its output
    async fn run(&self, cmd: &str) -> Result<CommandOutput, TransportError>;

    /// Run a command, aborting after `timeout`
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, TransportError>;

    /// Short identifier for logging ("ssh", "local", ...)
    fn runner_kind(&self) -> &'static str;
}
