//! Rule-by-rule coverage of the built-in classifier
//!
//! Also exercises the `IntentClassifier` trait with custom implementations,
//! the way application code plugs in its own rules.

use intentline_classifiers::{
    ClassifierConfig, FixedJitter, IntentClassifier, RuleClassifier, TypeRuleSpec,
};
use intentline_core::{EntityKind, Error, Intent, IntentType, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A classifier that always assigns one type - for testing the trait seam
pub struct FixedTypeClassifier {
    intent_type: IntentType,
    call_count: AtomicU32,
}

impl FixedTypeClassifier {
    pub fn new(intent_type: IntentType) -> Self {
        Self {
            intent_type,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl IntentClassifier for FixedTypeClassifier {
    fn classify(&self, text: &str) -> Result<Intent> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(Intent::new(text, self.intent_type, 1.0))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// A classifier that always fails - for testing error paths
pub struct FailingClassifier;

impl IntentClassifier for FailingClassifier {
    fn classify(&self, _text: &str) -> Result<Intent> {
        Err(Error::classifier("Simulated classifier failure"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn classifier() -> RuleClassifier {
    RuleClassifier::new()
        .unwrap()
        .with_confidence_source(Arc::new(FixedJitter(0.0)))
}

#[test]
fn test_each_default_rule() {
    let cases = [
        ("add a glass of water", IntentType::Create),
        ("show my sleep history", IntentType::Read),
        ("edit my morning routine", IntentType::Update),
        ("remove the yoga session", IntentType::Delete),
        ("book a massage next week", IntentType::Schedule),
        ("remind me to stretch", IntentType::Remind),
        ("how many steps did I take", IntentType::Query),
        ("is my streak alive?", IntentType::Query),
        ("go to settings", IntentType::Navigate),
        ("xyzzy plugh", IntentType::Unknown),
    ];

    let c = classifier();
    for (text, expected) in cases {
        assert_eq!(
            c.classify(text).unwrap().intent_type,
            expected,
            "unexpected type for '{}'",
            text
        );
    }
}

#[test]
fn test_rule_order_decides_ties() {
    // Matches both the create and the remind rule
    let intent = classifier().classify("create a reminder").unwrap();
    assert_eq!(intent.intent_type, IntentType::Create);
}

#[test]
fn test_rules_are_inspectable_in_order() {
    let c = classifier();
    let order: Vec<_> = c.type_rules().rules().iter().map(|r| r.intent()).collect();

    assert_eq!(order.first(), Some(&IntentType::Create));
    assert_eq!(order.last(), Some(&IntentType::Navigate));
    assert!(c.type_rules().rules()[0].matches("make a smoothie"));
}

#[test]
fn test_case_variants_classify_alike() {
    let c = classifier();
    let a = c.classify("Schedule A Meeting Tomorrow At 3PM").unwrap();
    let b = c.classify("schedule a meeting tomorrow at 3pm").unwrap();

    assert_eq!(a.intent_type, b.intent_type);
    assert_eq!(a.entities.len(), b.entities.len());
    assert_eq!(a.entity(EntityKind::Date), Some("Tomorrow"));
}

#[test]
fn test_custom_config_rules() {
    let config = ClassifierConfig {
        type_rules: vec![TypeRuleSpec::new(IntentType::Navigate, r"(?i)^home$")],
        entity_rules: Vec::new(),
        max_jitter: 0.0,
    };
    let c = RuleClassifier::from_config(&config).unwrap();

    assert_eq!(c.classify("HOME").unwrap().intent_type, IntentType::Navigate);
    assert_eq!(c.classify("create a note").unwrap().intent_type, IntentType::Unknown);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ClassifierConfig {
        type_rules: vec![TypeRuleSpec::new(IntentType::Create, "([")],
        ..ClassifierConfig::default()
    };
    let err = RuleClassifier::from_config(&config).err().unwrap();
    assert!(err.is_config());
}

#[test]
fn test_trait_objects() {
    let fixed = Arc::new(FixedTypeClassifier::new(IntentType::Read));
    let classifiers: Vec<Arc<dyn IntentClassifier>> =
        vec![fixed.clone(), Arc::new(FailingClassifier)];

    assert_eq!(
        classifiers[0].classify("anything").unwrap().intent_type,
        IntentType::Read
    );
    assert_eq!(fixed.call_count(), 1);
    assert!(matches!(
        classifiers[1].classify("anything"),
        Err(Error::Classifier(_))
    ));
}
