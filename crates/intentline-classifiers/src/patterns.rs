//! Ordered type rules (first match wins)

use crate::config::TypeRuleSpec;
use intentline_core::{Error, IntentType, Result};
use regex::Regex;

/// A compiled `(label, matcher)` pair
#[derive(Debug, Clone)]
pub struct TypeRule {
    intent: IntentType,
    regex: Regex,
}

impl TypeRule {
    /// Compile a rule from its pattern
    pub fn new(intent: IntentType, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::config(format!("Failed to compile {} rule: {}", intent, e))
        })?;
        Ok(Self { intent, regex })
    }

    /// Intent type this rule assigns
    pub fn intent(&self) -> IntentType {
        self.intent
    }

    /// Whether the rule matches the text
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Ordered list of type rules
#[derive(Debug, Clone, Default)]
pub struct TypeRuleSet {
    rules: Vec<TypeRule>,
}

impl TypeRuleSet {
    /// Compile rules, preserving their order
    pub fn from_specs(specs: &[TypeRuleSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|spec| TypeRule::new(spec.intent, &spec.pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// The rules in evaluation order
    pub fn rules(&self) -> &[TypeRule] {
        &self.rules
    }

    /// Type of the first matching rule, if any
    pub fn first_match(&self, text: &str) -> Option<IntentType> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(TypeRule::intent)
    }

    /// Type of the first matching rule, falling back to `unknown`
    pub fn classify(&self, text: &str) -> IntentType {
        self.first_match(text).unwrap_or(IntentType::Unknown)
    }
}
