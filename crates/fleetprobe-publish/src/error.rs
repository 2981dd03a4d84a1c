//! Publisher error types

use thiserror::Error;

/// Errors that can occur while publishing results
#[derive(Error, Debug)]
pub enum PublishError {
    /// State file I/O failed
    #[error("state file error: {0}")]
    Io(#[from] std::io::Error),

    /// Result serialization failed
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Bus URL could not be parsed
    #[error("invalid bus url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// WebSocket transport failed
    #[error("websocket error: {0}")]
    WebSocket(String),
}
