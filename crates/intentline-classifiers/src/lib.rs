//! Intentline Classifiers
//!
//! Deterministic, rule-based classification of free-form commands into typed
//! intents. Classification never consults shared state: the same rule set and
//! confidence source always produce the same type and entities for a text.
//!
//! The classifier is built from three pieces:
//! - An ordered list of type rules; the first matching rule decides the intent type
//! - An independent list of entity rules; every rule may contribute one entity
//! - A confidence source that adds a bounded jitter to the score

pub mod classifier;
pub mod confidence;
pub mod config;
pub mod entities;
pub mod patterns;

pub use classifier::{IntentClassifier, RuleClassifier};
pub use confidence::{ConfidenceSource, FixedJitter, RandomJitter, CONFIDENCE_RANGE};
pub use config::{load_config, ClassifierConfig, EntityRuleSpec, TypeRuleSpec};
pub use entities::{EntityExtractor, EntityRule};
pub use patterns::{TypeRule, TypeRuleSet};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{IntentClassifier, RuleClassifier};
    pub use crate::confidence::{ConfidenceSource, FixedJitter, RandomJitter};
    pub use crate::config::ClassifierConfig;
}
