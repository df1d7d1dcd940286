//! Metrics aggregation and reporting

use intentline_core::IntentType;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A single observation reported by the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricEvent {
    /// A text was turned into an intent, from cache or by the classifier
    Classified { latency: Duration, cache_hit: bool },

    /// An intent went through the dispatcher
    Dispatched {
        intent_type: IntentType,
        priority: i32,
        latency: Duration,
        success: bool,
    },
}

/// Metrics aggregator for the intent pipeline
///
/// Cheap to clone; all clones share the same counters. Every update, snapshot,
/// and reset takes the same lock, so a snapshot never observes a half-applied
/// event or a partial reset.
#[derive(Clone, Default)]
pub struct MetricsAggregator {
    inner: Arc<RwLock<MetricsState>>,
}

#[derive(Debug, Default)]
struct MetricsState {
    total_processed: u64,
    total_succeeded: u64,
    total_failed: u64,
    avg_processing_time_us: f64,
    avg_dispatch_time_us: f64,
    cache_hits: u64,
    cache_misses: u64,
    priority_histogram: BTreeMap<i32, u64>,
    type_histogram: BTreeMap<IntentType, u64>,
}

impl MetricsAggregator {
    /// Create a new metrics aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn record(&self, event: MetricEvent) {
        {
            let mut state = self.inner.write();
            match event {
                MetricEvent::Classified { latency, cache_hit } => {
                    if cache_hit {
                        state.cache_hits += 1;
                    } else {
                        state.cache_misses += 1;
                    }
                    let n = state.cache_hits + state.cache_misses;
                    state.avg_processing_time_us =
                        running_mean(state.avg_processing_time_us, micros(latency), n);
                }
                MetricEvent::Dispatched {
                    intent_type,
                    priority,
                    latency,
                    success,
                } => {
                    state.total_processed += 1;
                    if success {
                        state.total_succeeded += 1;
                    } else {
                        state.total_failed += 1;
                    }
                    let n = state.total_processed;
                    state.avg_dispatch_time_us =
                        running_mean(state.avg_dispatch_time_us, micros(latency), n);
                    *state.priority_histogram.entry(priority).or_insert(0) += 1;
                    *state.type_histogram.entry(intent_type).or_insert(0) += 1;
                }
            }
        }

        export(&event);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.inner.read();
        MetricsSnapshot {
            total_processed: state.total_processed,
            total_succeeded: state.total_succeeded,
            total_failed: state.total_failed,
            avg_processing_time_us: state.avg_processing_time_us,
            avg_dispatch_time_us: state.avg_dispatch_time_us,
            cache_hits: state.cache_hits,
            cache_misses: state.cache_misses,
            priority_histogram: state.priority_histogram.clone(),
            type_histogram: state.type_histogram.clone(),
        }
    }

    /// Discard all counters, averages, and histograms
    pub fn reset(&self) {
        *self.inner.write() = MetricsState::default();
        debug!("Metrics reset");
    }
}

/// Register descriptions for every exported metric with the installed recorder
pub fn describe_metrics() {
    ::metrics::describe_counter!(
        "intentline_classifications_total",
        "Texts turned into intents, by cache outcome"
    );
    ::metrics::describe_histogram!(
        "intentline_classification_latency_us",
        ::metrics::Unit::Microseconds,
        "Cache lookup plus classification latency in microseconds"
    );
    ::metrics::describe_counter!(
        "intentline_dispatches_total",
        "Dispatched intents by type and outcome"
    );
    ::metrics::describe_counter!(
        "intentline_dispatches_by_priority_total",
        "Dispatched intents by priority"
    );
    ::metrics::describe_histogram!(
        "intentline_dispatch_latency_us",
        ::metrics::Unit::Microseconds,
        "Backend dispatch latency in microseconds"
    );
}

/// Incremental mean: O(1) memory regardless of the number of samples
fn running_mean(mean: f64, sample: f64, n: u64) -> f64 {
    mean + (sample - mean) / n as f64
}

fn micros(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000_000.0
}

fn export(event: &MetricEvent) {
    match *event {
        MetricEvent::Classified { latency, cache_hit } => {
            let cache = if cache_hit { "hit" } else { "miss" };
            ::metrics::counter!("intentline_classifications_total", "cache" => cache).increment(1);
            ::metrics::histogram!("intentline_classification_latency_us").record(micros(latency));
        }
        MetricEvent::Dispatched {
            intent_type,
            priority,
            latency,
            success,
        } => {
            let outcome = if success { "success" } else { "failure" };
            ::metrics::counter!(
                "intentline_dispatches_total",
                "type" => intent_type.as_str(),
                "outcome" => outcome
            )
            .increment(1);
            ::metrics::counter!("intentline_dispatches_by_priority_total", "priority" => priority.to_string())
                .increment(1);
            ::metrics::histogram!("intentline_dispatch_latency_us").record(micros(latency));
        }
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_processed: u64,
    pub total_succeeded: u64,
    pub total_failed: u64,
    pub avg_processing_time_us: f64,
    pub avg_dispatch_time_us: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub priority_histogram: BTreeMap<i32, u64>,
    pub type_histogram: BTreeMap<IntentType, u64>,
}

impl MetricsSnapshot {
    /// Fraction of dispatches that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            self.total_succeeded as f64 / self.total_processed as f64
        }
    }

    /// Fraction of classifications served from cache
    pub fn cache_hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}
