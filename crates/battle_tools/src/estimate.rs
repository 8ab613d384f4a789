//! Pre-battle estimates for two side powers.

use battle_core::power::estimate_win_rate;
use battle_core::validation::validate_battle;
use serde::Serialize;

/// Validator verdict and win-rate hint for one matchup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimate {
    /// Attacker power.
    pub attacker_power: u32,
    /// Defender power.
    pub defender_power: u32,
    /// Attacker level minus defender level.
    pub level_diff: i32,
    /// Whether the validator accepts the battle.
    pub valid: bool,
    /// Human-readable rejection reason.
    pub reason: Option<String>,
    /// Attacker win-rate estimate, as a decimal string.
    pub win_rate: String,
}

/// Run the validator and the win-rate estimator on two powers.
pub fn estimate(attacker_power: u32, defender_power: u32, level_diff: i32) -> Estimate {
    let check = validate_battle(attacker_power, defender_power, level_diff);
    Estimate {
        attacker_power,
        defender_power,
        level_diff,
        valid: check.valid,
        reason: check.reason.map(|r| r.to_string()),
        win_rate: estimate_win_rate(attacker_power, defender_power).to_string(),
    }
}
