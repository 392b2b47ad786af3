//! Construction-time errors
//!
//! Per-tick anomalies never surface here; they are logged and absorbed by the
//! simulation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("grid must be at least 3x3, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl GenerationError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Invalid(#[from] GenerationError),
}

/// Failure to restore a saved session
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to parse save: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("save holds an unusable level: {0}")]
    Invalid(#[from] GenerationError),
}
