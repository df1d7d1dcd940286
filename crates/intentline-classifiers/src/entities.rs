//! Entity extraction (dates, times, people, durations)

use crate::config::EntityRuleSpec;
use intentline_core::{EntityKind, Error, Result};
use regex::Regex;
use std::collections::BTreeMap;

/// A compiled entity rule
#[derive(Debug, Clone)]
pub struct EntityRule {
    kind: EntityKind,
    regex: Regex,
}

impl EntityRule {
    /// Compile a rule from its pattern
    pub fn new(kind: EntityKind, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::config(format!("Failed to compile {} entity rule: {}", kind, e))
        })?;
        Ok(Self { kind, regex })
    }

    /// Entity kind this rule records
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// First match in the text; capture group 1 when the pattern has one
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        let caps = self.regex.captures(text)?;
        caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str())
    }
}

/// Applies every entity rule independently
#[derive(Debug, Clone, Default)]
pub struct EntityExtractor {
    rules: Vec<EntityRule>,
}

impl EntityExtractor {
    /// Compile rules from configuration
    pub fn from_specs(specs: &[EntityRuleSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|spec| EntityRule::new(spec.entity, &spec.pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[EntityRule] {
        &self.rules
    }

    /// Extract entities; the first match per kind is kept
    pub fn extract(&self, text: &str) -> BTreeMap<EntityKind, String> {
        let mut entities = BTreeMap::new();

        for rule in &self.rules {
            if entities.contains_key(&rule.kind) {
                continue;
            }
            if let Some(found) = rule.find(text) {
                entities.insert(rule.kind, found.to_string());
            }
        }

        entities
    }
}
