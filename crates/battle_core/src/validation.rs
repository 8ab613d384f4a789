//! Pre-flight battle eligibility.
//!
//! Rejections are values, not errors: callers decide whether to block the
//! request or proceed with a warning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest level gap (attacker minus defender) that may still fight.
pub const MAX_LEVEL_DIFF: i32 = 5;

/// Attacker may be at most this many times stronger than the defender.
pub const MAX_POWER_RATIO: u32 = 10;

/// Defender may be at most this many times stronger than the attacker.
pub const MAX_UNDERDOG_RATIO: u32 = 30;

/// Why a battle was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Rejection {
    /// Attacker level is too far above the defender's.
    #[error("Level difference too large ({diff} > {MAX_LEVEL_DIFF})")]
    LevelGap {
        /// Attacker level minus defender level.
        diff: i32,
    },
    /// Attacker overwhelms the defender.
    #[error("Power difference too large (attacker {attacker} > {MAX_POWER_RATIO}x defender {defender})")]
    PowerGap {
        /// Attacker power.
        attacker: u32,
        /// Defender power.
        defender: u32,
    },
    /// Defender overwhelms the attacker.
    #[error("Power difference too large (defender {defender} > {MAX_UNDERDOG_RATIO}x attacker {attacker})")]
    HopelessOdds {
        /// Attacker power.
        attacker: u32,
        /// Defender power.
        defender: u32,
    },
}

/// Outcome of [`validate_battle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the battle may proceed.
    pub valid: bool,
    /// Reason for refusal when `valid` is false.
    pub reason: Option<Rejection>,
}

impl ValidationResult {
    /// An accepting result.
    #[must_use]
    pub const fn accept() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// A refusing result.
    #[must_use]
    pub const fn reject(reason: Rejection) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    /// Convert into a `Result`, for callers that want `?` propagation.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] when the battle was refused.
    pub fn into_result(self) -> Result<(), Rejection> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

/// Check whether two sides are close enough to make a meaningful battle.
///
/// `level_diff` is attacker level minus defender level, in whatever level
/// scale the caller uses.
#[must_use]
pub fn validate_battle(attacker_power: u32, defender_power: u32, level_diff: i32) -> ValidationResult {
    if level_diff > MAX_LEVEL_DIFF {
        return ValidationResult::reject(Rejection::LevelGap { diff: level_diff });
    }

    let attacker = u64::from(attacker_power);
    let defender = u64::from(defender_power);

    if attacker > defender * u64::from(MAX_POWER_RATIO) {
        return ValidationResult::reject(Rejection::PowerGap {
            attacker: attacker_power,
            defender: defender_power,
        });
    }
    if defender > attacker * u64::from(MAX_UNDERDOG_RATIO) {
        return ValidationResult::reject(Rejection::HopelessOdds {
            attacker: attacker_power,
            defender: defender_power,
        });
    }

    ValidationResult::accept()
}
