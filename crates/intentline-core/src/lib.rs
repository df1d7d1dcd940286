//! Intentline Core
//!
//! Core types and error handling shared across the Intentline crates.
//!
//! This crate provides:
//! - The `Intent` record and its lifecycle (`pending -> processing -> completed | failed`)
//! - The closed set of intent categories and entity kinds
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{EntityKind, Intent, IntentId, IntentStatus, IntentType};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{EntityKind, Intent, IntentId, IntentStatus, IntentType};
}
