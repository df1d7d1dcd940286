//! Hands classified intents to the execution backend

use crate::backend::{BackendResponse, ExecutionBackend};
use intentline_core::{Error, Intent, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outcome of one backend round-trip
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Backend reported success and did not error
    pub success: bool,

    /// Backend response, when the call returned one
    pub response: Option<BackendResponse>,

    /// Failure description, when `success` is false
    pub error: Option<String>,

    /// Wall-clock duration of the backend call
    pub duration: Duration,
}

/// Forwards intents to the configured backend
#[derive(Clone, Default)]
pub struct Dispatcher {
    backend: Option<Arc<dyn ExecutionBackend>>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A dispatcher with no backend; every dispatch is a configuration error
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// The configured backend, or a configuration error
    pub fn backend(&self) -> Result<&Arc<dyn ExecutionBackend>> {
        self.backend
            .as_ref()
            .ok_or_else(|| Error::config("no execution backend configured"))
    }

    /// Dispatch an intent by id and normalize the outcome
    ///
    /// Only a missing backend produces `Err`. Backend failures and backend
    /// errors both become an outcome with `success == false`.
    pub async fn dispatch(&self, intent: &Intent) -> Result<DispatchOutcome> {
        let backend = self.backend()?;

        let start = Instant::now();
        let result = backend.dispatch_intent(&intent.id).await;
        let duration = start.elapsed();

        let outcome = match result {
            Ok(response) if response.success => DispatchOutcome {
                success: true,
                response: Some(response),
                error: None,
                duration,
            },
            Ok(response) => {
                let reason = response
                    .message
                    .clone()
                    .unwrap_or_else(|| "backend reported failure".to_string());
                DispatchOutcome {
                    success: false,
                    response: Some(response),
                    error: Some(reason),
                    duration,
                }
            }
            Err(e) => DispatchOutcome {
                success: false,
                response: None,
                error: Some(e.to_string()),
                duration,
            },
        };

        if outcome.success {
            debug!(intent_id = %intent.id, duration_us = duration.as_micros() as u64, "Dispatch succeeded");
        } else {
            warn!(
                intent_id = %intent.id,
                error = outcome.error.as_deref().unwrap_or_default(),
                "Dispatch failed"
            );
        }

        Ok(outcome)
    }
}
