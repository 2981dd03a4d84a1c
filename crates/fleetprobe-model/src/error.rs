//! Error types for fleetprobe-model

use thiserror::Error;

/// Errors that can occur while building the component model
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    /// Component URI could not be parsed
    #[error("invalid component uri: {0}")]
    InvalidUri(String),

    /// Status payload was neither valid JSON nor valid YAML
    #[error("unparseable status payload: {0}")]
    PayloadSyntax(String),
}
