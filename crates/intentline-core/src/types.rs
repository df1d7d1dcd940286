//! Core types for Intentline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;
use uuid::Uuid;

/// Unique identifier assigned to an intent at classification time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(Uuid);

impl IntentId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for IntentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for IntentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| Error::internal(format!("invalid intent id '{}': {}", s, e)))
    }
}

/// Category assigned to a classified command
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IntentType {
    Create,
    Read,
    Update,
    Delete,
    Schedule,
    Remind,
    Query,
    Navigate,
    #[default]
    Unknown,
}

impl IntentType {
    /// All categories, in declaration order
    pub const ALL: [IntentType; 9] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Delete,
        Self::Schedule,
        Self::Remind,
        Self::Query,
        Self::Navigate,
        Self::Unknown,
    ];

    /// Lower-case label used in configuration and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Schedule => "schedule",
            Self::Remind => "remind",
            Self::Query => "query",
            Self::Navigate => "navigate",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::config(format!("unknown intent type '{}'", s)))
    }
}

/// Kind of entity extracted from command text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Date,
    Time,
    Person,
    Duration,
}

impl EntityKind {
    /// Lower-case label used in configuration and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Person => "person",
            Self::Duration => "duration",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl IntentStatus {
    /// Completed and failed intents never change state again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn can_transition_to(&self, next: IntentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A classified, typed representation of a raw text command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Identifier assigned at classification time
    pub id: IntentId,

    /// Assigned category
    #[serde(rename = "type")]
    pub intent_type: IntentType,

    /// Original input text
    pub text: String,

    /// Confidence score (0.0-1.0), informational only
    pub confidence: f32,

    /// Extracted entities; a missing kind was not detected
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entities: BTreeMap<EntityKind, String>,

    /// Current lifecycle state
    pub status: IntentStatus,

    /// Scheduling priority, higher is served first
    pub priority: i32,

    /// Classification time, refreshed on cache hits
    pub timestamp: SystemTime,
}

impl Intent {
    /// Create a new pending intent
    pub fn new(text: impl Into<String>, intent_type: IntentType, confidence: f32) -> Self {
        Self {
            id: IntentId::new(),
            intent_type,
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            entities: BTreeMap::new(),
            status: IntentStatus::Pending,
            priority: 0,
            timestamp: SystemTime::now(),
        }
    }

    /// Set the scheduling priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Attach extracted entities
    pub fn with_entities(mut self, entities: BTreeMap<EntityKind, String>) -> Self {
        self.entities = entities;
        self
    }

    /// Look up an extracted entity
    pub fn entity(&self, kind: EntityKind) -> Option<&str> {
        self.entities.get(&kind).map(String::as_str)
    }

    /// Promote to `processing` right before dispatch
    pub fn mark_processing(&mut self) -> Result<()> {
        self.transition(IntentStatus::Processing)
    }

    /// Terminate as `completed`
    pub fn mark_completed(&mut self) -> Result<()> {
        self.transition(IntentStatus::Completed)
    }

    /// Terminate as `failed`
    pub fn mark_failed(&mut self) -> Result<()> {
        self.transition(IntentStatus::Failed)
    }

    fn transition(&mut self, next: IntentStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::Lifecycle {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Copy holding only the classification outcome, reset to `pending`
    pub fn classification_snapshot(&self) -> Self {
        Self {
            status: IntentStatus::Pending,
            ..self.clone()
        }
    }
}
