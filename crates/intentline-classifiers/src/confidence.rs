//! Confidence scoring with a bounded jitter source

use rand::Rng;
use std::ops::RangeInclusive;

/// Range every confidence score falls in
pub const CONFIDENCE_RANGE: RangeInclusive<f32> = 0.0..=1.0;

const MATCHED_BASE: f32 = 0.75;
const UNMATCHED_BASE: f32 = 0.25;
const ENTITY_BONUS: f32 = 0.05;

/// Source of the jitter added to every confidence score
pub trait ConfidenceSource: Send + Sync {
    /// A value in `[0.0, max)` for some source-specific `max`
    fn jitter(&self) -> f32;
}

/// Uniform random jitter in `[0.0, max)`
#[derive(Debug, Clone, Copy)]
pub struct RandomJitter {
    max: f32,
}

impl RandomJitter {
    /// Non-finite or negative bounds disable jitter
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        Self { max }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl ConfidenceSource for RandomJitter {
    fn jitter(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(0.0..self.max)
    }
}

/// Constant jitter for reproducible tests
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub f32);

impl ConfidenceSource for FixedJitter {
    fn jitter(&self) -> f32 {
        self.0
    }
}

/// Combine match outcome and jitter into a clamped score
pub fn score(matched: bool, has_entities: bool, jitter: f32) -> f32 {
    let base = if matched { MATCHED_BASE } else { UNMATCHED_BASE };
    let bonus = if has_entities { ENTITY_BONUS } else { 0.0 };
    (base + bonus + jitter).clamp(*CONFIDENCE_RANGE.start(), *CONFIDENCE_RANGE.end())
}
