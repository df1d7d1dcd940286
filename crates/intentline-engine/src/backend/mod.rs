//! Execution backend capability
//!
//! The pipeline consumes exactly three operations from the system that
//! actually carries out a command. It assumes nothing else about it.

pub mod memory;

use async_trait::async_trait;
use intentline_core::{IntentId, Result};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

pub use memory::{InMemoryBackend, Scenario};

/// Trait for all execution backends
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Execute the named intent and report the outcome
    ///
    /// `Ok` with `success == false` and `Err` are both treated as a failed
    /// dispatch by the pipeline.
    async fn dispatch_intent(&self, intent_id: &IntentId) -> Result<BackendResponse>;

    /// Associate a dispatched intent with a session
    async fn store_intent(&self, intent_id: &IntentId, session_id: &str) -> Result<()>;

    /// Intents stored for a session, oldest first
    async fn get_session_history(&self, session_id: &str) -> Result<Vec<StoredIntent>>;
}

/// Outcome reported by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    /// The only field the dispatcher interprets
    pub success: bool,

    /// Optional human-readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Backend-specific payload, passed through untouched
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl BackendResponse {
    /// A successful response with no payload
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            payload: serde_json::Value::Null,
        }
    }

    /// An unsuccessful response with a reason
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            payload: serde_json::Value::Null,
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// An intent recorded against a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredIntent {
    pub intent_id: IntentId,
    pub session_id: String,
    pub stored_at: SystemTime,
}
