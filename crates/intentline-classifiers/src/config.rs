//! Configuration for classifier rules

use intentline_core::{EntityKind, Error, IntentType, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the rule classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Type rules, evaluated in order; the first match wins
    #[serde(default = "default_type_rules")]
    pub type_rules: Vec<TypeRuleSpec>,

    /// Entity rules, evaluated independently
    #[serde(default = "default_entity_rules")]
    pub entity_rules: Vec<EntityRuleSpec>,

    /// Upper bound (exclusive) of the random confidence jitter
    #[serde(default = "default_max_jitter")]
    pub max_jitter: f32,
}

/// A single type rule as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRuleSpec {
    /// Intent type assigned when the pattern matches
    pub intent: IntentType,

    /// Regular expression matched against the raw text
    pub pattern: String,
}

/// A single entity rule as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRuleSpec {
    /// Entity kind recorded when the pattern matches
    pub entity: EntityKind,

    /// Regular expression; capture group 1 is recorded when present
    pub pattern: String,
}

impl TypeRuleSpec {
    pub fn new(intent: IntentType, pattern: impl Into<String>) -> Self {
        Self {
            intent,
            pattern: pattern.into(),
        }
    }
}

impl EntityRuleSpec {
    pub fn new(entity: EntityKind, pattern: impl Into<String>) -> Self {
        Self {
            entity,
            pattern: pattern.into(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            type_rules: default_type_rules(),
            entity_rules: default_entity_rules(),
            max_jitter: default_max_jitter(),
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load from file
    pub fn from_file(
        path: impl AsRef<Path>,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }

    /// Reject settings the rule classifier cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.max_jitter.is_finite() || !(0.0..=1.0).contains(&self.max_jitter) {
            return Err(Error::config(format!(
                "classifier.max_jitter must be within [0.0, 1.0], got {}",
                self.max_jitter
            )));
        }
        Ok(())
    }
}

/// Load classifier configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<ClassifierConfig> {
    let config = ClassifierConfig::from_file(path.as_ref())
        .map_err(|e| Error::config(format!("Failed to load classifier config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

fn default_type_rules() -> Vec<TypeRuleSpec> {
    vec![
        TypeRuleSpec::new(
            IntentType::Create,
            r"(?i)\b(create|add|new|make|log|record|start)\b",
        ),
        TypeRuleSpec::new(
            IntentType::Read,
            r"(?i)\b(show|display|view|list|open|read|get|see)\b",
        ),
        TypeRuleSpec::new(
            IntentType::Update,
            r"(?i)\b(update|change|edit|modify|rename|adjust)\b",
        ),
        TypeRuleSpec::new(
            IntentType::Delete,
            r"(?i)\b(delete|remove|cancel|clear|erase|drop)\b",
        ),
        TypeRuleSpec::new(
            IntentType::Schedule,
            r"(?i)\b(schedule|reschedule|book|plan|arrange)\b",
        ),
        TypeRuleSpec::new(
            IntentType::Remind,
            r"(?i)\b(remind|reminder|alert|notify)\b",
        ),
        TypeRuleSpec::new(
            IntentType::Query,
            r"(?i)(\b(what|when|where|who|why|how|which|status|check)\b|\?\s*$)",
        ),
        TypeRuleSpec::new(
            IntentType::Navigate,
            r"(?i)\b(go to|navigate|take me|switch to|go back|return to)\b",
        ),
    ]
}

fn default_entity_rules() -> Vec<EntityRuleSpec> {
    vec![
        EntityRuleSpec::new(
            EntityKind::Date,
            r"(?i)\b(today|tomorrow|tonight|yesterday|(?:next|this) (?:week|month|year|monday|tuesday|wednesday|thursday|friday|saturday|sunday)|monday|tuesday|wednesday|thursday|friday|saturday|sunday|\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}(?:/\d{2,4})?)\b",
        ),
        EntityRuleSpec::new(
            EntityKind::Time,
            r"(?i)\b(\d{1,2}(?::\d{2})?\s?(?:am|pm)|\d{1,2}:\d{2}|noon|midnight)\b",
        ),
        EntityRuleSpec::new(
            EntityKind::Person,
            r"\bwith ([A-Z][a-z]+(?: [A-Z][a-z]+)?)",
        ),
        EntityRuleSpec::new(
            EntityKind::Duration,
            r"(?i)\b(\d+\s?(?:minutes?|mins?|hours?|hrs?|days?|weeks?))\b",
        ),
    ]
}

fn default_max_jitter() -> f32 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_category() {
        let config = ClassifierConfig::default();
        let types: Vec<_> = config.type_rules.iter().map(|r| r.intent).collect();

        for t in IntentType::ALL.iter().filter(|t| **t != IntentType::Unknown) {
            assert!(types.contains(t), "missing rule for {}", t);
        }
        assert!(!types.contains(&IntentType::Unknown));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
type_rules:
  - intent: query
    pattern: "(?i)^how much"
"#;
        let config = ClassifierConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.type_rules.len(), 1);
        assert_eq!(config.type_rules[0].intent, IntentType::Query);
        assert_eq!(config.entity_rules, default_entity_rules());
        assert_eq!(config.max_jitter, 0.2);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.yaml");
        std::fs::write(
            &path,
            "entity_rules:\n  - entity: person\n    pattern: \"\\\\bfor ([A-Z][a-z]+)\"\nmax_jitter: 0.0\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.entity_rules.len(), 1);
        assert_eq!(config.entity_rules[0].entity, EntityKind::Person);
        assert_eq!(config.max_jitter, 0.0);
    }

    #[test]
    fn test_infinite_jitter_rejected() {
        let config = ClassifierConfig::from_yaml("max_jitter: .inf\n").unwrap();
        assert!(config.max_jitter.is_infinite());
        assert!(config.validate().unwrap_err().is_config());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.yaml");
        std::fs::write(&path, "max_jitter: .inf\n").unwrap();
        assert!(load_config(&path).unwrap_err().is_config());
    }

    #[test]
    fn test_jitter_bounds() {
        let mut config = ClassifierConfig::default();
        assert!(config.validate().is_ok());

        config.max_jitter = 1.0;
        assert!(config.validate().is_ok());

        config.max_jitter = -0.1;
        assert!(config.validate().is_err());

        config.max_jitter = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/classifier.yaml").unwrap_err();
        assert!(err.is_config());
    }
}
