//! Classifier trait and the rule-based implementation

use crate::confidence::{self, ConfidenceSource, RandomJitter};
use crate::config::ClassifierConfig;
use crate::entities::EntityExtractor;
use crate::patterns::TypeRuleSet;
use intentline_core::{Intent, IntentType, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Trait for all intent classifiers
///
/// Implementations must not keep mutable state between calls. An `Err` is a
/// defect in the classifier, not a handled outcome; callers propagate it.
pub trait IntentClassifier: Send + Sync {
    /// Classify the given text into a new `pending` intent
    fn classify(&self, text: &str) -> Result<Intent>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Ordered-rule classifier
///
/// Assigns the type of the first matching type rule, extracts entities with
/// every entity rule, and scores confidence with the injected jitter source.
/// The built-in rules never fail at classification time.
#[derive(Clone)]
pub struct RuleClassifier {
    type_rules: TypeRuleSet,
    entities: EntityExtractor,
    confidence: Arc<dyn ConfidenceSource>,
}

impl RuleClassifier {
    /// Create a classifier with the built-in rules
    pub fn new() -> Result<Self> {
        Self::from_config(&ClassifierConfig::default())
    }

    /// Create a classifier from configuration
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            type_rules: TypeRuleSet::from_specs(&config.type_rules)?,
            entities: EntityExtractor::from_specs(&config.entity_rules)?,
            confidence: Arc::new(RandomJitter::new(config.max_jitter)),
        })
    }

    /// Replace the confidence jitter source
    pub fn with_confidence_source(mut self, source: Arc<dyn ConfidenceSource>) -> Self {
        self.confidence = source;
        self
    }

    /// The compiled type rules in evaluation order
    pub fn type_rules(&self) -> &TypeRuleSet {
        &self.type_rules
    }

    /// The compiled entity rules
    pub fn entity_extractor(&self) -> &EntityExtractor {
        &self.entities
    }
}

impl IntentClassifier for RuleClassifier {
    fn classify(&self, text: &str) -> Result<Intent> {
        let start = Instant::now();

        let intent_type = self.type_rules.classify(text);
        let entities = self.entities.extract(text);
        let score = confidence::score(
            intent_type != IntentType::Unknown,
            !entities.is_empty(),
            self.confidence.jitter(),
        );

        let intent = Intent::new(text, intent_type, score).with_entities(entities);

        debug!(
            intent_id = %intent.id,
            intent_type = %intent.intent_type,
            entities = intent.entities.len(),
            latency_us = start.elapsed().as_micros() as u64,
            "Classified text"
        );

        Ok(intent)
    }

    fn name(&self) -> &str {
        "rule_classifier"
    }
}
