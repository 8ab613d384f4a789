//! Error types for the battle engine.
//!
//! Ordinary battle outcomes (draws, escapes, empty rosters) are never errors.
//! These variants cover contract violations at construction time, data
//! loading, report encoding, and validator rejections surfaced through
//! [`crate::report::BattleEngine::resolve_validated`].

use thiserror::Error;

use crate::validation::Rejection;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for the battle engine.
#[derive(Debug, Error)]
pub enum BattleError {
    /// A combat unit violated one of its stat invariants.
    #[error("Invalid unit {id}: {reason}")]
    InvalidUnit {
        /// Identifier of the offending unit.
        id: u32,
        /// Which invariant was broken.
        reason: String,
    },

    /// A battle configuration value is out of range.
    #[error("Invalid battle config: {0}")]
    InvalidConfig(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or label) of the source that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Report encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The validator refused the battle.
    #[error("Battle rejected: {0}")]
    Rejected(#[from] Rejection),
}
