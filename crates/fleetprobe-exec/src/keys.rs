//! SSH key resolution
//!
//! A target authenticates with a key file, the SSH agent, or a
//! base64-encoded key taken from an environment variable (useful in
//! containers where mounting key files is awkward). Env keys are
//! written to a private temp file owned by the resolved key, so two
//! targets resolving different variables in the same run never share
//! or clobber each other's key material; the file is removed when the
//! resolved key is dropped.

use std::env;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use base64::Engine;
use tempfile::NamedTempFile;

use crate::error::TransportError;

/// Where a target's SSH private key comes from
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Key file on disk
    Path(PathBuf),
    /// SSH agent
    Agent,
    /// Base64-encoded key in the named environment variable
    Env(String),
}

impl KeySource {
    /// Resolve to something the SSH session can authenticate with
    ///
    /// # Errors
    /// Returns `TransportError::SshKeyError` when the key file is
    /// world-readable, the environment variable is unset, or the
    /// encoded key cannot be decoded or written out.
    pub fn resolve(&self) -> Result<ResolvedKey, TransportError> {
        match self {
            KeySource::Path(path) => {
                ensure_private(path)?;
                Ok(ResolvedKey::Path(path.clone()))
            }
            KeySource::Agent => Ok(ResolvedKey::Agent),
            KeySource::Env(var) => {
                let encoded = env::var(var).map_err(|_| {
                    TransportError::SshKeyError(format!("environment variable {var} not set"))
                })?;
                let data = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| {
                        TransportError::SshKeyError(format!("invalid base64 key in {var}: {e}"))
                    })?;

                Ok(ResolvedKey::Temp(write_temp_key(&data)?))
            }
        }
    }
}

/// A key the SSH session can use directly
#[derive(Debug)]
pub enum ResolvedKey {
    /// Key file on disk
    Path(PathBuf),
    /// SSH agent
    Agent,
    /// Temp file holding a decoded env key; removed when dropped
    Temp(NamedTempFile),
}

impl ResolvedKey {
    /// Path to the key file, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolvedKey::Path(p) => Some(p),
            ResolvedKey::Temp(f) => Some(f.path()),
            ResolvedKey::Agent => None,
        }
    }

    /// Whether authentication goes through the SSH agent
    #[must_use]
    pub fn use_agent(&self) -> bool {
        matches!(self, ResolvedKey::Agent)
    }
}

/// Reject keys readable by group or other (ssh itself would too)
fn ensure_private(path: &Path) -> Result<(), TransportError> {
    let metadata = fs::metadata(path)
        .map_err(|e| TransportError::SshKeyError(format!("{}: {e}", path.display())))?;

    if metadata.permissions().mode() & 0o77 != 0 {
        return Err(TransportError::SshKeyError(format!(
            "key file permissions too open: {} (should be 600)",
            path.display()
        )));
    }

    Ok(())
}

fn write_temp_key(data: &[u8]) -> Result<NamedTempFile, TransportError> {
    let io_err = |e: std::io::Error| TransportError::SshKeyError(format!("temp key file: {e}"));

    // NamedTempFile creates with a unique name and mode 600
    let mut file = tempfile::Builder::new()
        .prefix("fleetprobe_ssh_key_")
        .tempfile()
        .map_err(io_err)?;
    file.write_all(data).map_err(io_err)?;

    Ok(file)
}
