//! Error types for the parsing surface of the animated view.
//!
//! The runtime API (`start`, `stop`, `update`, `render`) never fails; it
//! substitutes defaults and logs instead. Errors only come out of the helpers
//! that turn caller-provided JSON into typed configs.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ViewError {
    /// Animation config input has an unsupported shape
    #[error("Invalid animation config: {reason}")]
    InvalidConfig { reason: String },

    /// Stop status is neither a boolean nor a `{start, end}` key list
    #[error("Invalid stop status: {reason}")]
    InvalidStopStatus { reason: String },

    /// Easing name not recognized
    #[error("Unknown easing: {name}")]
    UnknownEasing { name: String },

    /// Composition strategy name not recognized
    #[error("Unknown animation type: {name}")]
    UnknownAnimationType { name: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl ViewError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } | Self::InvalidStopStatus { .. } => "validation",
            Self::UnknownEasing { .. } | Self::UnknownAnimationType { .. } => "lookup",
            Self::SerializationError { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}
