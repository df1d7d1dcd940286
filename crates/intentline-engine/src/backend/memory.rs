//! In-memory execution backend with fault injection

use super::{BackendResponse, ExecutionBackend, StoredIntent};
use async_trait::async_trait;
use intentline_core::{Error, IntentId, Result};
use parking_lot::{Mutex, RwLock};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Fault-injection settings for [`InMemoryBackend`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Probability of an `Ok` response with `success == false`
    #[serde(default)]
    pub failure_rate: f64,

    /// Probability of the call returning `Err`
    #[serde(default)]
    pub error_rate: f64,

    /// Simulated round-trip time per dispatch
    #[serde(default)]
    pub latency_ms: u64,
}

impl Scenario {
    /// Every dispatch reports `success == false`
    pub fn always_fail() -> Self {
        Self {
            failure_rate: 1.0,
            ..Self::default()
        }
    }

    /// Every dispatch returns an error
    pub fn outage() -> Self {
        Self {
            error_rate: 1.0,
            ..Self::default()
        }
    }
}

/// Reference backend that keeps session history in memory
///
/// Succeeds on every dispatch unless a [`Scenario`] injects failures.
pub struct InMemoryBackend {
    rng: Mutex<StdRng>,
    scenario: RwLock<Scenario>,
    sessions: RwLock<HashMap<String, Vec<StoredIntent>>>,
    dispatch_count: AtomicU64,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Seeded backend for reproducible failure sequences
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            scenario: RwLock::new(Scenario::default()),
            sessions: RwLock::new(HashMap::new()),
            dispatch_count: AtomicU64::new(0),
        }
    }

    /// Replace the fault-injection scenario
    pub fn set_custom_scenario(&self, scenario: Scenario) {
        debug!(?scenario, "Backend scenario updated");
        *self.scenario.write() = scenario;
    }

    /// Get current scenario
    pub fn scenario(&self) -> Scenario {
        *self.scenario.read()
    }

    /// Number of dispatch calls received
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionBackend for InMemoryBackend {
    async fn dispatch_intent(&self, intent_id: &IntentId) -> Result<BackendResponse> {
        self.dispatch_count.fetch_add(1, Ordering::Relaxed);
        let scenario = self.scenario();

        if scenario.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(scenario.latency_ms)).await;
        }

        let roll: f64 = self.rng.lock().gen();

        if roll < scenario.error_rate {
            return Err(Error::backend(format!(
                "simulated outage while dispatching {}",
                intent_id
            )));
        }

        if roll < scenario.error_rate + scenario.failure_rate {
            return Ok(BackendResponse::failed("simulated execution failure"));
        }

        Ok(BackendResponse::ok().with_payload(serde_json::json!({
            "intent_id": intent_id.to_string(),
        })))
    }

    async fn store_intent(&self, intent_id: &IntentId, session_id: &str) -> Result<()> {
        self.sessions
            .write()
            .entry(session_id.to_string())
            .or_default()
            .push(StoredIntent {
                intent_id: *intent_id,
                session_id: session_id.to_string(),
                stored_at: SystemTime::now(),
            });
        Ok(())
    }

    async fn get_session_history(&self, session_id: &str) -> Result<Vec<StoredIntent>> {
        Ok(self
            .sessions
            .read()
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_scenario_succeeds() {
        let backend = InMemoryBackend::with_seed(7);
        let response = backend.dispatch_intent(&IntentId::new()).await.unwrap();

        assert!(response.success);
        assert_eq!(backend.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn test_always_fail_scenario() {
        let backend = InMemoryBackend::with_seed(7);
        backend.set_custom_scenario(Scenario::always_fail());

        let response = backend.dispatch_intent(&IntentId::new()).await.unwrap();
        assert!(!response.success);
        assert!(response.message.is_some());
    }

    #[tokio::test]
    async fn test_outage_scenario() {
        let backend = InMemoryBackend::with_seed(7);
        backend.set_custom_scenario(Scenario::outage());

        let err = backend.dispatch_intent(&IntentId::new()).await.unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[tokio::test]
    async fn test_seeded_failure_sequence_is_reproducible() {
        let scenario = Scenario {
            failure_rate: 0.5,
            ..Scenario::default()
        };
        let a = InMemoryBackend::with_seed(42);
        let b = InMemoryBackend::with_seed(42);
        a.set_custom_scenario(scenario);
        b.set_custom_scenario(scenario);

        for _ in 0..20 {
            let id = IntentId::new();
            assert_eq!(
                a.dispatch_intent(&id).await.unwrap().success,
                b.dispatch_intent(&id).await.unwrap().success
            );
        }
    }

    #[tokio::test]
    async fn test_session_history() {
        let backend = InMemoryBackend::new();
        let first = IntentId::new();
        let second = IntentId::new();

        backend.store_intent(&first, "s1").await.unwrap();
        backend.store_intent(&second, "s1").await.unwrap();

        let history = backend.get_session_history("s1").await.unwrap();
        assert_eq!(
            history.iter().map(|s| s.intent_id).collect::<Vec<_>>(),
            vec![first, second]
        );
        assert!(backend.get_session_history("other").await.unwrap().is_empty());
    }
}
