//! Error types for Intentline

use crate::types::IntentStatus;

/// Result type alias using Intentline's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Intentline operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Execution backend errors
    #[error("backend error: {0}")]
    Backend(String),

    /// Scheduled work was lost before it produced a result
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// Illegal intent status transition
    #[error("invalid intent transition from {from} to {to}")]
    Lifecycle { from: IntentStatus, to: IntentStatus },

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a new scheduler error
    pub fn scheduler(msg: impl Into<String>) -> Self {
        Self::Scheduler(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error means no attempt was made because of missing setup
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
