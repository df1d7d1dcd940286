//! Intent processor: classification, caching, scheduling, and dispatch
//!
//! The processor is the only entry point application code needs:
//! - `process_text` turns raw text into a pending `Intent` (cache first, classifier on miss)
//! - `dispatch_intent` runs an intent through the backend and terminates its lifecycle
//! - `queue_*` variants route the same operations through the priority scheduler
//! - `process_and_dispatch` composes classification and dispatch into one call
//!
//! Every logical operation updates the metrics aggregator exactly once.
//! Classification and dispatch are metered independently.

use crate::backend::{BackendResponse, ExecutionBackend, StoredIntent};
use crate::cache::{normalize_key, IntentCache};
use crate::config::PipelineConfig;
use crate::dispatcher::Dispatcher;
use crate::scheduler::{PriorityScheduler, TaskHandle};
use intentline_classifiers::{ConfidenceSource, IntentClassifier, RuleClassifier};
use intentline_core::{Intent, IntentId, Result};
use intentline_telemetry::{MetricEvent, MetricsAggregator, MetricsSnapshot};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info};

/// Result of turning text into an intent
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The classified intent, always `pending`
    pub intent: Intent,

    /// Served from the result cache
    pub cached: bool,

    /// Time spent in cache lookup and classification
    pub processing_time: Duration,
}

/// Result of dispatching an intent
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// Backend reported success
    pub success: bool,

    /// The intent, now `completed` or `failed`
    pub intent: Intent,

    /// Backend response, when the backend returned one
    pub response: Option<BackendResponse>,

    /// Failure description, when `success` is false
    pub error: Option<String>,

    /// Wall-clock duration of the backend call
    pub dispatch_time: Duration,
}

/// Result of classification followed by dispatch
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub classification: ProcessingResult,
    pub dispatch: DispatchResult,
}

impl PipelineOutcome {
    pub fn success(&self) -> bool {
        self.dispatch.success
    }
}

/// Orchestrates classifier, cache, scheduler, dispatcher, and metrics
///
/// Cheap to clone; clones share every component.
#[derive(Clone)]
pub struct IntentProcessor {
    inner: Arc<ProcessorInner>,
}

struct ProcessorInner {
    classifier: Arc<dyn IntentClassifier>,
    cache: IntentCache,
    scheduler: PriorityScheduler,
    dispatcher: Dispatcher,
    metrics: MetricsAggregator,
    default_priority: i32,
}

/// Builder wiring explicit components into an [`IntentProcessor`]
pub struct ProcessorBuilder {
    config: PipelineConfig,
    classifier: Option<Arc<dyn IntentClassifier>>,
    confidence: Option<Arc<dyn ConfidenceSource>>,
    backend: Option<Arc<dyn ExecutionBackend>>,
    metrics: Option<MetricsAggregator>,
}

impl ProcessorBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            classifier: None,
            confidence: None,
            backend: None,
            metrics: None,
        }
    }

    /// Replace the pipeline configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom classifier instead of the configured rule classifier
    pub fn classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Confidence jitter source for the rule classifier
    pub fn confidence_source(mut self, source: Arc<dyn ConfidenceSource>) -> Self {
        self.confidence = Some(source);
        self
    }

    /// Execution backend used for dispatch
    pub fn backend(mut self, backend: Arc<dyn ExecutionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Share an existing metrics aggregator
    pub fn metrics(mut self, metrics: MetricsAggregator) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<IntentProcessor> {
        self.config.validate()?;

        let classifier: Arc<dyn IntentClassifier> = match self.classifier {
            Some(classifier) => classifier,
            None => {
                let mut rules = RuleClassifier::from_config(&self.config.classifier)?;
                if let Some(source) = self.confidence {
                    rules = rules.with_confidence_source(source);
                }
                Arc::new(rules)
            }
        };

        let dispatcher = match self.backend {
            Some(backend) => Dispatcher::new(backend),
            None => Dispatcher::unconfigured(),
        };

        info!(
            classifier = classifier.name(),
            cache_capacity = self.config.cache.capacity,
            concurrency = self.config.scheduler.concurrency,
            backend = dispatcher.is_configured(),
            "Intent processor initialized"
        );

        Ok(IntentProcessor {
            inner: Arc::new(ProcessorInner {
                classifier,
                cache: IntentCache::new(self.config.cache.capacity, self.config.cache.ttl()),
                scheduler: PriorityScheduler::new(self.config.scheduler.concurrency),
                dispatcher,
                metrics: self.metrics.unwrap_or_default(),
                default_priority: self.config.default_priority,
            }),
        })
    }
}

impl IntentProcessor {
    /// Start building a processor from default configuration
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::new(PipelineConfig::default())
    }

    /// Turn raw text into a pending intent
    ///
    /// A cache hit returns the cached classification with a fresh timestamp
    /// and the caller's priority. A miss runs the classifier and stores the
    /// result. Never touches the scheduler or the backend. Only a defective
    /// custom classifier can make this return `Err`.
    pub fn process_text(&self, text: &str, priority: Option<i32>) -> Result<ProcessingResult> {
        let start = Instant::now();
        let priority = priority.unwrap_or(self.inner.default_priority);
        let key = normalize_key(text);

        if let Some(mut intent) = self.inner.cache.get(&key) {
            intent.timestamp = SystemTime::now();
            intent.priority = priority;

            let processing_time = start.elapsed();
            self.inner.metrics.record(MetricEvent::Classified {
                latency: processing_time,
                cache_hit: true,
            });
            debug!(intent_id = %intent.id, intent_type = %intent.intent_type, "Cache hit");

            return Ok(ProcessingResult {
                intent,
                cached: true,
                processing_time,
            });
        }

        let classified = self.inner.classifier.classify(text);
        let processing_time = start.elapsed();
        self.inner.metrics.record(MetricEvent::Classified {
            latency: processing_time,
            cache_hit: false,
        });

        let intent = classified?.with_priority(priority);
        self.inner.cache.set(&key, &intent);
        debug!(intent_id = %intent.id, intent_type = %intent.intent_type, "Cache miss");

        Ok(ProcessingResult {
            intent,
            cached: false,
            processing_time,
        })
    }

    /// Dispatch a pending intent and terminate its lifecycle
    ///
    /// Returns `Err` only when no backend is configured (before any state
    /// change) or when the intent is not `pending`. Backend failures come back
    /// as `Ok` with `success == false` and the intent marked `failed`.
    pub async fn dispatch_intent(&self, mut intent: Intent) -> Result<DispatchResult> {
        self.inner.dispatcher.backend()?;
        intent.mark_processing()?;

        let outcome = self.inner.dispatcher.dispatch(&intent).await?;
        if outcome.success {
            intent.mark_completed()?;
        } else {
            intent.mark_failed()?;
        }

        self.inner.metrics.record(MetricEvent::Dispatched {
            intent_type: intent.intent_type,
            priority: intent.priority,
            latency: outcome.duration,
            success: outcome.success,
        });

        Ok(DispatchResult {
            success: outcome.success,
            intent,
            response: outcome.response,
            error: outcome.error,
            dispatch_time: outcome.duration,
        })
    }

    /// Classify, then dispatch the resulting intent
    ///
    /// A classification error short-circuits before any dispatch attempt.
    pub async fn process_and_dispatch(
        &self,
        text: &str,
        priority: Option<i32>,
    ) -> Result<PipelineOutcome> {
        self.inner.dispatcher.backend()?;

        let classification = self.process_text(text, priority)?;
        let dispatch = self
            .dispatch_intent(classification.intent.clone())
            .await?;

        Ok(PipelineOutcome {
            classification,
            dispatch,
        })
    }

    /// `process_text` through the scheduler
    ///
    /// Like every `queue_*` call, this needs a tokio runtime; outside one the
    /// handle resolves to `Error::Scheduler` without running anything.
    pub fn queue_process_text(
        &self,
        text: impl Into<String>,
        priority: Option<i32>,
    ) -> TaskHandle<ProcessingResult> {
        let this = self.clone();
        let text = text.into();
        let priority = priority.unwrap_or(self.inner.default_priority);

        self.inner.scheduler.submit(priority, move || async move {
            this.process_text(&text, Some(priority))
        })
    }

    /// `dispatch_intent` through the scheduler, at the intent's priority
    ///
    /// A missing backend is reported here, before anything is queued.
    pub fn queue_dispatch_intent(&self, intent: Intent) -> Result<TaskHandle<DispatchResult>> {
        self.inner.dispatcher.backend()?;

        let this = self.clone();
        let priority = intent.priority;
        Ok(self
            .inner
            .scheduler
            .submit(priority, move || async move { this.dispatch_intent(intent).await }))
    }

    /// `process_and_dispatch` through the scheduler as one work item
    pub fn queue_process_and_dispatch(
        &self,
        text: impl Into<String>,
        priority: Option<i32>,
    ) -> Result<TaskHandle<PipelineOutcome>> {
        self.inner.dispatcher.backend()?;

        let this = self.clone();
        let text = text.into();
        let priority = priority.unwrap_or(self.inner.default_priority);
        Ok(self.inner.scheduler.submit(priority, move || async move {
            this.process_and_dispatch(&text, Some(priority)).await
        }))
    }

    /// Record a dispatched intent in a backend session
    pub async fn store_in_session(&self, intent_id: &IntentId, session_id: &str) -> Result<()> {
        self.inner
            .dispatcher
            .backend()?
            .store_intent(intent_id, session_id)
            .await
    }

    /// Intents the backend stored for a session
    pub async fn session_history(&self, session_id: &str) -> Result<Vec<StoredIntent>> {
        self.inner
            .dispatcher
            .backend()?
            .get_session_history(session_id)
            .await
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn reset_metrics(&self) {
        self.inner.metrics.reset();
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    pub fn cache(&self) -> &IntentCache {
        &self.inner.cache
    }

    pub fn scheduler(&self) -> &PriorityScheduler {
        &self.inner.scheduler
    }

    pub fn metrics(&self) -> &MetricsAggregator {
        &self.inner.metrics
    }

    pub fn default_priority(&self) -> i32 {
        self.inner.default_priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{InMemoryBackend, Scenario};
    use intentline_classifiers::FixedJitter;
    use intentline_core::{EntityKind, Error, IntentStatus, IntentType};

    fn processor_with(backend: Arc<InMemoryBackend>) -> IntentProcessor {
        IntentProcessor::builder()
            .backend(backend)
            .confidence_source(Arc::new(FixedJitter(0.0)))
            .build()
            .unwrap()
    }

    fn processor() -> IntentProcessor {
        processor_with(Arc::new(InMemoryBackend::with_seed(3)))
    }

    struct BrokenClassifier;

    impl IntentClassifier for BrokenClassifier {
        fn classify(&self, _text: &str) -> Result<Intent> {
            Err(Error::classifier("rule table corrupted"))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let p = processor();

        let first = p.process_text("Create a new item", None).unwrap();
        let second = p.process_text("  create A NEW item ", None).unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.intent.intent_type, second.intent.intent_type);
        assert_eq!(first.intent.entities, second.intent.entities);
        assert!(second.intent.timestamp >= first.intent.timestamp);

        let snapshot = p.metrics_snapshot();
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.total_processed, 0);
    }

    #[test]
    fn test_default_and_explicit_priority() {
        let p = processor();
        assert_eq!(p.process_text("go to settings", None).unwrap().intent.priority, 1);
        assert_eq!(p.process_text("go to settings", Some(9)).unwrap().intent.priority, 9);
    }

    #[test]
    fn test_process_text_extracts_entities() {
        let result = processor()
            .process_text("schedule a meeting tomorrow at 3pm", None)
            .unwrap();

        assert_eq!(result.intent.intent_type, IntentType::Schedule);
        assert_eq!(result.intent.entity(EntityKind::Date), Some("tomorrow"));
        assert_eq!(result.intent.entity(EntityKind::Time), Some("3pm"));
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let p = processor();
        let intent = p.process_text("add a glass of water", Some(4)).unwrap().intent;

        let result = p.dispatch_intent(intent).await.unwrap();
        assert!(result.success);
        assert_eq!(result.intent.status, IntentStatus::Completed);

        let snapshot = p.metrics_snapshot();
        assert_eq!(snapshot.total_processed, 1);
        assert_eq!(snapshot.total_succeeded, 1);
        assert_eq!(snapshot.priority_histogram.get(&4), Some(&1));
        assert_eq!(snapshot.type_histogram.get(&IntentType::Create), Some(&1));
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_a_result() {
        let backend = Arc::new(InMemoryBackend::with_seed(3));
        backend.set_custom_scenario(Scenario::outage());
        let p = processor_with(backend);

        let intent = p.process_text("delete my last run", None).unwrap().intent;
        let result = p.dispatch_intent(intent).await.unwrap();

        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(result.intent.status, IntentStatus::Failed);
        assert_eq!(p.metrics_snapshot().total_failed, 1);
    }

    #[tokio::test]
    async fn test_no_backend_is_config_error() {
        let p = IntentProcessor::builder().build().unwrap();
        let intent = p.process_text("show my goals", None).unwrap().intent;

        assert!(p.dispatch_intent(intent.clone()).await.unwrap_err().is_config());
        assert!(p.queue_dispatch_intent(intent).err().unwrap().is_config());
        assert!(p
            .process_and_dispatch("show my goals", None)
            .await
            .unwrap_err()
            .is_config());
        assert!(p.session_history("s").await.unwrap_err().is_config());
        assert_eq!(p.metrics_snapshot().total_processed, 0);
    }

    #[tokio::test]
    async fn test_terminal_intent_cannot_be_redispatched() {
        let p = processor();
        let intent = p.process_text("add a note", None).unwrap().intent;
        let done = p.dispatch_intent(intent).await.unwrap().intent;

        let err = p.dispatch_intent(done).await.unwrap_err();
        assert!(matches!(err, Error::Lifecycle { .. }));
        assert_eq!(p.metrics_snapshot().total_processed, 1);
    }

    #[tokio::test]
    async fn test_process_and_dispatch_meters_both() {
        let p = processor();
        let outcome = p.process_and_dispatch("remind me to drink water", None).await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.classification.intent.status, IntentStatus::Pending);
        assert_eq!(outcome.dispatch.intent.status, IntentStatus::Completed);
        assert_eq!(outcome.dispatch.intent.id, outcome.classification.intent.id);

        let snapshot = p.metrics_snapshot();
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.total_processed, 1);
    }

    #[tokio::test]
    async fn test_classifier_error_short_circuits() {
        let backend = Arc::new(InMemoryBackend::with_seed(3));
        let p = IntentProcessor::builder()
            .backend(backend.clone())
            .classifier(Arc::new(BrokenClassifier))
            .build()
            .unwrap();

        let err = p.process_and_dispatch("anything", None).await.unwrap_err();
        assert!(matches!(err, Error::Classifier(_)));
        assert_eq!(backend.dispatch_count(), 0);
        assert!(p.cache().is_empty());
        assert_eq!(p.metrics_snapshot().cache_misses, 1);
    }

    #[tokio::test]
    async fn test_queued_operations_run_after_resume() {
        let p = processor();
        p.scheduler().pause();

        let low = p.process_text("add a run", Some(1)).unwrap().intent;
        let high = p.process_text("delete a run", Some(5)).unwrap().intent;

        let low_handle = p.queue_dispatch_intent(low).unwrap();
        let high_handle = p.queue_dispatch_intent(high).unwrap();
        let text_handle = p.queue_process_text("what is the status", Some(3));
        assert_eq!(p.scheduler().pending_count(), 3);

        p.scheduler().resume();
        let high_result = high_handle.await.unwrap();
        let text_result = text_handle.await.unwrap();
        let low_result = low_handle.await.unwrap();

        assert!(high_result.success && low_result.success);
        assert_eq!(text_result.intent.intent_type, IntentType::Query);
    }

    #[tokio::test]
    async fn test_queue_process_and_dispatch() {
        let p = processor();
        let outcome = p
            .queue_process_and_dispatch("book a massage next week", Some(2))
            .unwrap()
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.dispatch.intent.priority, 2);
        assert_eq!(outcome.dispatch.intent.intent_type, IntentType::Schedule);
    }

    #[tokio::test]
    async fn test_session_passthrough() {
        let p = processor();
        let outcome = p.process_and_dispatch("log a workout", None).await.unwrap();
        let id = outcome.dispatch.intent.id;

        p.store_in_session(&id, "session-1").await.unwrap();
        let history = p.session_history("session-1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].intent_id, id);
    }

    #[test]
    fn test_queue_outside_runtime_resolves_to_error() {
        let p = processor();
        let handle = p.queue_process_text("add water", None);

        let err = futures::executor::block_on(handle).unwrap_err();
        assert!(matches!(err, Error::Scheduler(_)));
        assert!(p.cache().is_empty());
    }

    #[test]
    fn test_clear_cache_and_reset_metrics() {
        let p = processor();
        p.process_text("add water", None).unwrap();
        p.clear_cache();
        p.reset_metrics();

        assert!(!p.process_text("add water", None).unwrap().cached);
        assert_eq!(p.metrics_snapshot().cache_misses, 1);
    }
}
