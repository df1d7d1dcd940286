use intentline_core::Intent;
use intentline_engine::{PipelineOutcome, ProcessingResult};
use intentline_telemetry::MetricsSnapshot;
use serde::Serialize;

/// One line of demo output
#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub text: String,
    pub intent: Intent,
    pub cached: bool,

    /// Absent when the command was only classified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatched: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub processing_time_us: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch_time_us: Option<u64>,
}

impl CommandReport {
    pub fn from_classification(text: impl Into<String>, result: &ProcessingResult) -> Self {
        Self {
            text: text.into(),
            intent: result.intent.clone(),
            cached: result.cached,
            dispatched: None,
            error: None,
            processing_time_us: result.processing_time.as_micros() as u64,
            dispatch_time_us: None,
        }
    }

    pub fn from_outcome(text: impl Into<String>, outcome: &PipelineOutcome) -> Self {
        Self {
            text: text.into(),
            intent: outcome.dispatch.intent.clone(),
            cached: outcome.classification.cached,
            dispatched: Some(outcome.dispatch.success),
            error: outcome.dispatch.error.clone(),
            processing_time_us: outcome.classification.processing_time.as_micros() as u64,
            dispatch_time_us: Some(outcome.dispatch.dispatch_time.as_micros() as u64),
        }
    }
}

/// Totals printed after a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub commands: usize,
    pub success_rate: f64,
    pub cache_hit_rate: f64,
    pub metrics: MetricsSnapshot,
}

impl RunSummary {
    pub fn new(commands: usize, metrics: MetricsSnapshot) -> Self {
        Self {
            commands,
            success_rate: metrics.success_rate(),
            cache_hit_rate: metrics.cache_hit_rate(),
            metrics,
        }
    }
}
