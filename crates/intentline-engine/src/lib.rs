//! Intentline Engine
//!
//! Turns free-form text into dispatched intents.
//!
//! This crate provides:
//! - A TTL-bounded LRU cache of classification results
//! - A bounded-concurrency priority scheduler
//! - The execution backend capability and an in-memory reference backend
//! - `IntentProcessor`, which wires classifier, cache, scheduler, dispatcher, and metrics together

pub mod backend;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod processor;
pub mod scheduler;

pub use backend::{BackendResponse, ExecutionBackend, InMemoryBackend, Scenario, StoredIntent};
pub use cache::{normalize_key, IntentCache};
pub use config::{CacheConfig, PipelineConfig, SchedulerConfig};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use processor::{
    DispatchResult, IntentProcessor, PipelineOutcome, ProcessingResult, ProcessorBuilder,
};
pub use scheduler::{PriorityScheduler, TaskHandle};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::backend::{ExecutionBackend, InMemoryBackend, Scenario};
    pub use crate::config::PipelineConfig;
    pub use crate::processor::{DispatchResult, IntentProcessor, PipelineOutcome, ProcessingResult};
    pub use crate::scheduler::{PriorityScheduler, TaskHandle};
}
