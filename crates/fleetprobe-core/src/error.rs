//! Core error types for fleetprobe-core

use thiserror::Error;

use crate::state::TargetState;

/// Errors that can occur in collection actor operations
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Target not found in registry
    #[error("target not found: {0}")]
    TargetNotFound(String),

    /// Target already exists in registry
    #[error("target already exists: {0}")]
    TargetAlreadyExists(String),

    /// Invalid state transition attempted
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current state
        from: TargetState,
        /// Attempted target state
        to: TargetState,
    },

    /// Command transport failed
    #[error("transport error: {0}")]
    TransportError(String),

    /// Component model error
    #[error("model error: {0}")]
    ModelError(String),

    /// Actor communication error
    #[error("actor communication error: {0}")]
    ActorError(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}
