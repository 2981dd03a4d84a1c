//! Configuration loading and types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use fleetprobe_core::{PollerConfig, ProbeConfig, TargetConfig};

/// Top-level configuration for the fleetprobe CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Status poller settings
    #[serde(default)]
    pub poller: PollerConfig,
    /// Result publisher settings
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// Fleet targets
    #[serde(default)]
    pub target: Vec<TargetConfig>,
    /// Local service probes
    #[serde(default)]
    pub probe: Vec<ProbeConfig>,
}

/// Result publisher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Directory state files are written to
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// WebSocket notification bus endpoint (optional)
    pub bus_url: Option<String>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            bus_url: None,
        }
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("/var/lib/fleetprobe")
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &PathBuf) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from default paths or use defaults
    pub fn load_default() -> eyre::Result<Self> {
        // Check environment variable
        if let Ok(path) = std::env::var("FLEETPROBE_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        // Try common paths
        let paths = [
            PathBuf::from("fleetprobe.toml"),
            PathBuf::from("/etc/fleetprobe/fleetprobe.toml"),
            dirs::config_dir()
                .map(|p| p.join("fleetprobe/fleetprobe.toml"))
                .unwrap_or_default(),
        ];

        for path in paths {
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Return default config if no file found
        tracing::warn!("no config file found, using defaults");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
[poller]
status_command = "yadt-status --json"
batch_size = 4

[publisher]
state_dir = "/tmp/fleetprobe-state"
bus_url = "ws://localhost:9000/events"

[[target]]
name = "web01"
addr = "10.0.0.5"
tags = ["web"]

[[target]]
name = "db01"
addr = "10.0.0.6"
user = "deploy"
ssh_key = "/home/deploy/.ssh/id_ed25519"

[[probe]]
service = "service://lb01/vip"
command = "curl -fsS http://10.0.0.100/health"
timeout_secs = 5
"#,
        )
        .unwrap();

        assert_eq!(config.poller.batch_size, 4);
        assert_eq!(config.target.len(), 2);
        assert_eq!(config.target[1].user, "deploy");
        assert_eq!(config.probe.len(), 1);
        assert_eq!(
            config.publisher.bus_url.as_deref(),
            Some("ws://localhost:9000/events")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert!(config.target.is_empty());
        assert_eq!(config.poller.batch_size, 8);
        assert_eq!(config.publisher.state_dir, default_state_dir());
    }
}
