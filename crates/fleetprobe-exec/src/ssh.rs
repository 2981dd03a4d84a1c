//! SSH transport for status-query commands
//!
//! One `SshRunner` holds the session for one fleet target. The session
//! is opened lazily on the first poll and reused for the following
//! cycles, so a fleet-wide collection pays the handshake once per
//! target.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use russh::keys::ssh_key;
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key};
use russh::{ChannelMsg, client};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::error::TransportError;
use crate::keys::{KeySource, ResolvedKey};
use crate::output::{CommandOutput, SshTarget};
use crate::traits::CommandRunner;

type Session = client::Handle<TargetHandler>;

/// russh client handler for a fleet target
#[derive(Debug)]
struct TargetHandler;

impl client::Handler for TargetHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        // Targets come from the fleet config, so any server key is
        // accepted. TODO: pin host keys per target in the config.
        Ok(true)
    }
}

/// SSH command runner for one target host
pub struct SshRunner {
    target: SshTarget,
    key: ResolvedKey,
    session: Mutex<Option<Session>>,
}

impl std::fmt::Debug for SshRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connected = self
            .session
            .try_lock()
            .map(|s| s.is_some())
            .unwrap_or(false);
        f.debug_struct("SshRunner")
            .field("target", &self.target)
            .field("connected", &connected)
            .finish_non_exhaustive()
    }
}

impl SshRunner {
    /// Resolve the key source and prepare a runner. No connection is
    /// made until the first command runs.
    ///
    /// # Errors
    /// Returns `TransportError::SshKeyError` if key resolution fails
    pub fn new(target: SshTarget, key_source: &KeySource) -> Result<Self, TransportError> {
        Ok(Self {
            target,
            key: key_source.resolve()?,
            session: Mutex::new(None),
        })
    }

    /// Lock the session, connecting and authenticating first if none is
    /// established yet.
    async fn session(&self) -> Result<MappedMutexGuard<'_, Session>, TransportError> {
        let mut slot = self.session.lock().await;

        if slot.is_none() {
            info!(
                host = %self.target.host,
                port = self.target.port,
                user = %self.target.user,
                "opening SSH session"
            );

            let config = Arc::new(client::Config::default());
            let mut session = client::connect(
                config,
                (&self.target.host[..], self.target.port),
                TargetHandler,
            )
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            self.authenticate(&mut session).await?;
            info!(host = %self.target.host, "SSH session ready");

            *slot = Some(session);
        }

        MutexGuard::try_map(slot, |s| s.as_mut()).map_err(|_| TransportError::NotConnected)
    }

    async fn authenticate(&self, session: &mut Session) -> Result<(), TransportError> {
        let Some(key_path) = self.key.path() else {
            // russh agent support is not wired up; the config accepts
            // the agent source but connecting with it is rejected here.
            return Err(TransportError::AuthenticationFailed(
                "SSH agent authentication not yet implemented".to_string(),
            ));
        };

        let key_pair = load_secret_key(key_path, None)
            .map_err(|e| TransportError::SshKeyError(e.to_string()))?;

        let hash_alg = session
            .best_supported_rsa_hash()
            .await
            .ok()
            .flatten()
            .flatten();
        let auth = session
            .authenticate_publickey(
                &self.target.user,
                PrivateKeyWithHashAlg::new(Arc::new(key_pair), hash_alg),
            )
            .await
            .map_err(|e| TransportError::AuthenticationFailed(e.to_string()))?;

        if !auth.success() {
            return Err(TransportError::AuthenticationFailed(format!(
                "public key rejected for {}@{}",
                self.target.user, self.target.host
            )));
        }

        Ok(())
    }

    /// Run the command over an exec channel and collect both streams
    #[instrument(skip(self, session), fields(host = %self.target.host))]
    async fn execute(
        &self,
        session: &mut Session,
        cmd: &str,
    ) -> Result<CommandOutput, TransportError> {
        let start = Instant::now();
        let io_err = |e: russh::Error| TransportError::IoError(e.to_string());

        let mut channel = session.channel_open_session().await.map_err(io_err)?;
        channel.exec(true, cmd).await.map_err(io_err)?;

        let mut status = -1;
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { data } => stdout.extend_from_slice(&data),
                // ext 1 is the stderr stream
                ChannelMsg::ExtendedData { data, ext: 1 } => stderr.extend_from_slice(&data),
                ChannelMsg::ExitStatus { exit_status } => status = exit_status.cast_signed(),
                ChannelMsg::Eof => break,
                _ => {}
            }
        }

        let output = CommandOutput {
            status,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            duration: start.elapsed(),
        };

        debug!(
            status = output.status,
            duration = ?output.duration,
            "remote command completed"
        );

        Ok(output)
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    #[instrument(skip(self), fields(host = %self.target.host))]
    async fn run(&self, cmd: &str) -> Result<CommandOutput, TransportError> {
        let mut session = self.session().await?;
        self.execute(&mut session, cmd).await
    }

    #[instrument(skip(self), fields(host = %self.target.host))]
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout_duration: Duration,
    ) -> Result<CommandOutput, TransportError> {
        // The handshake is not counted against the command timeout
        let mut session = self.session().await?;

        timeout(timeout_duration, self.execute(&mut session, cmd))
            .await
            .map_err(|_| {
                warn!(
                    host = %self.target.host,
                    command = %cmd,
                    timeout = ?timeout_duration,
                    "remote command timed out"
                );
                TransportError::Timeout {
                    timeout: timeout_duration,
                }
            })?
    }

    fn runner_kind(&self) -> &'static str {
        "ssh"
    }
}

/// Builder for `SshRunner`
pub struct SshRunnerBuilder {
    target: SshTarget,
    key_source: KeySource,
}

impl SshRunnerBuilder {
    /// Create builder with required fields; the key source defaults to
    /// the SSH agent
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            target: SshTarget::new(host, user),
            key_source: KeySource::Agent,
        }
    }

    /// Set SSH key path
    #[must_use]
    pub fn with_key_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.key_source = KeySource::Path(path.into());
        self
    }

    /// Use SSH agent
    #[must_use]
    pub fn with_agent(mut self) -> Self {
        self.key_source = KeySource::Agent;
        self
    }

    /// Set key from environment variable (base64)
    #[must_use]
    pub fn with_env_key(mut self, var_name: impl Into<String>) -> Self {
        self.key_source = KeySource::Env(var_name.into());
        self
    }

    /// Set custom port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.target.port = port;
        self
    }

    /// Build the runner
    ///
    /// # Errors
    /// Returns `TransportError::SshKeyError` if key resolution fails
    pub fn build(self) -> Result<SshRunner, TransportError> {
        SshRunner::new(self.target, &self.key_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    #[test]
    fn test_builder_resolves_env_key() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"fake key material");
        unsafe { std::env::set_var("FLEETPROBE_TEST_BUILDER_KEY", &encoded) };

        let runner = SshRunnerBuilder::new("web01", "root")
            .with_env_key("FLEETPROBE_TEST_BUILDER_KEY")
            .with_port(2222)
            .build()
            .unwrap();

        assert_eq!(runner.runner_kind(), "ssh");
        assert!(format!("{runner:?}").contains("connected: false"));

        unsafe { std::env::remove_var("FLEETPROBE_TEST_BUILDER_KEY") };
    }

    #[test]
    fn test_builder_rejects_missing_key_file() {
        let result = SshRunnerBuilder::new("web01", "root")
            .with_key_path("/no/such/id_ed25519")
            .build();

        assert!(matches!(result, Err(TransportError::SshKeyError(_))));
    }
}
