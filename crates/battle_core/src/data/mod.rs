//! Data structures for battle definitions.
//!
//! This module contains pure data structures that describe units and whole
//! battles. All structs are designed to be deserialized from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `battle_tools`.

mod scenario_data;
mod unit_data;

pub use scenario_data::BattleScenario;
pub use unit_data::UnitData;

use serde::de::DeserializeOwned;

use crate::error::{BattleError, Result};

/// Parse RON text, labelling failures with `source`.
pub(crate) fn parse_ron<T: DeserializeOwned>(source: &str, text: &str) -> Result<T> {
    ron::from_str(text).map_err(|e| BattleError::DataParseError {
        path: source.to_string(),
        message: e.to_string(),
    })
}
