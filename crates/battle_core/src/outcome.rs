//! Qualitative outcome classification.
//!
//! The win type is narration for reports. It never changes who won.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::simulation::BattleRound;

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinType {
    /// The last defender fell in the final round.
    Annihilation,
    /// The battle was decided early without wiping out the defenders.
    Breakthrough,
    /// The round cap ran out with no decisive result.
    Escape,
}

/// Classify a finished round log.
///
/// Reads the survivor counts recorded on each round; the unit totals are
/// the roster sizes the battle started with.
#[must_use]
pub fn classify(
    rounds: &[BattleRound],
    total_attacker_units: u32,
    total_defender_units: u32,
) -> WinType {
    let Some(last) = rounds.last() else {
        return WinType::Escape;
    };
    if last.winner.is_none() {
        return WinType::Escape;
    }

    debug_assert!(last.attackers_alive <= total_attacker_units);
    debug_assert!(last.defenders_alive <= total_defender_units);

    let defenders_before = match rounds.len() {
        1 => total_defender_units,
        n => rounds[n - 2].defenders_alive,
    };
    let annihilated =
        total_defender_units > 0 && last.defenders_alive == 0 && defenders_before > 0;

    trace!(
        rounds = rounds.len(),
        total_attacker_units,
        total_defender_units,
        annihilated,
        "Classifying outcome"
    );

    if annihilated {
        WinType::Annihilation
    } else {
        WinType::Breakthrough
    }
}
