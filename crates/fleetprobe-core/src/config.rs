//! Configuration types for targets and status collection

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a single fleet target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Unique target name
    pub name: String,
    /// IP address or hostname for the SSH connection
    pub addr: String,
    /// SSH user (defaults to root)
    #[serde(default = "default_user")]
    pub user: String,
    /// SSH port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to SSH private key (optional, falls back to ssh-agent)
    pub ssh_key: Option<String>,
    /// Environment variable holding a base64-encoded SSH key; takes
    /// effect when `ssh_key` is unset
    pub ssh_key_env: Option<String>,
    /// Tags for filtering and grouping
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_user() -> String {
    "root".to_string()
}

fn default_port() -> u16 {
    22
}

/// Settings for the status poller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Remote command that prints the status payload
    #[serde(default = "default_status_command")]
    pub status_command: String,
    /// Number of targets polled in parallel
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Per-command timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_status_command() -> String {
    "fleet-status --json".to_string()
}

fn default_batch_size() -> usize {
    8
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            status_command: default_status_command(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PollerConfig {
    /// Per-command timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// A local probe for a service whose state must be checked from the
/// controller process (load balancer VIPs and the like)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Service URI the probe result applies to
    pub service: String,
    /// Command run on the controller; exit 0 means up
    pub command: String,
    /// Probe timeout in seconds (falls back to the prober default)
    pub timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults() {
        let config: TargetConfig = toml::from_str(
            r#"
name = "web01"
addr = "10.0.0.5"
"#,
        )
        .unwrap();

        assert_eq!(config.user, "root");
        assert_eq!(config.port, 22);
        assert!(config.tags.is_empty());
    }

    #[test]
    fn test_poller_defaults() {
        let config = PollerConfig::default();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}
