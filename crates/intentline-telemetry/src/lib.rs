//! Intentline Telemetry
//!
//! Runtime metrics for the intent pipeline.
//!
//! Provides:
//! - An in-process aggregator with a consistent, resettable snapshot
//! - Forwarding of every event to the `metrics` facade for external exporters

pub mod metrics;

pub use metrics::{describe_metrics, MetricEvent, MetricsAggregator, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricEvent, MetricsAggregator, MetricsSnapshot};
}
