//! Error type for the tools crate.

use battle_core::BattleError;
use thiserror::Error;

/// Errors raised while loading data or running tools.
#[derive(Error, Debug)]
pub enum ToolError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The engine rejected the data or the battle.
    #[error(transparent)]
    Battle(#[from] BattleError),
    /// Failed to encode JSON output.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Some data files in a directory failed validation.
    #[error("{failed} of {total} data files failed validation")]
    ValidationFailed {
        /// Files that failed.
        failed: usize,
        /// Files checked.
        total: usize,
    },
}
