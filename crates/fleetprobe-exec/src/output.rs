//! Output and connection types for command execution

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Captured output of a status-query command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Exit status code (0 for success)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandOutput {
    /// Check if the command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Combine stdout and stderr
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// SSH connection coordinates for a target host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshTarget {
    /// Host address
    pub host: String,
    /// Port (default 22)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username
    pub user: String,
}

fn default_port() -> u16 {
    22
}

impl SshTarget {
    /// Create a new SSH target
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
        }
    }

    /// Set a custom port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output() {
        let out = CommandOutput {
            status: 0,
            stdout: "hello".to_string(),
            stderr: String::new(),
            duration: Duration::from_millis(1),
        };
        assert_eq!(out.combined_output(), "hello");

        let out = CommandOutput {
            status: 1,
            stdout: "hello".to_string(),
            stderr: "oops".to_string(),
            duration: Duration::from_millis(1),
        };
        assert_eq!(out.combined_output(), "hello\noops");
        assert!(!out.success());
    }

    #[test]
    fn test_ssh_target_defaults() {
        let target = SshTarget::new("web01", "probe");
        assert_eq!(target.port, 22);

        let target = target.with_port(2222);
        assert_eq!(target.port, 2222);
    }
}
