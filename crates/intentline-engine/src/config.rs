//! Pipeline configuration

use intentline_classifiers::ClassifierConfig;
use intentline_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Priority assigned when a caller does not pass one
    #[serde(default = "default_priority")]
    pub default_priority: i32,

    /// Result cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Classifier rules
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl PipelineConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse pipeline config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, or use defaults when it does not exist
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.concurrency == 0 {
            return Err(Error::config("scheduler.concurrency must be at least 1"));
        }
        self.classifier.validate()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            cache: CacheConfig::default(),
            scheduler: SchedulerConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Entry time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum number of concurrently running work items
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_priority() -> i32 {
    1
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_concurrency() -> usize {
    5
}
