//! Battle tuning constants.
//!
//! A [`BattleConfig`] is an immutable value passed to every engine call.
//! Different callers may run battles under different balance settings at
//! the same time; nothing here is global.
//!
//! # Example RON
//!
//! Every field is optional; omitted fields keep their default.
//!
//! ```ron
//! BattleConfig(
//!     max_rounds: 12,
//!     damage_variance: "0.1",
//!     win_exp_multiplier: "2",
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::data::parse_ron;
use crate::error::{BattleError, Result};
use crate::math::{percent, Fixed, Ratio};

/// Tunable constants for one simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BattleConfig {
    /// Hard cap on simulated rounds. Exhausting it ends the battle as an escape.
    pub max_rounds: u32,
    /// Damage dealt by a 100-attack unit before defense and rolls.
    pub base_damage: Fixed,
    /// Symmetric variance fraction; damage is scaled by `[1 - v, 1 + v]`.
    pub damage_variance: Fixed,
    /// Crit chance given to units whose data does not specify one.
    pub critical_rate: Fixed,
    /// Global crit multiplier, applied on top of the unit's own.
    pub critical_damage: Fixed,
    /// Chance that any single attack misses outright.
    pub miss_chance: Fixed,
    /// Experience before multipliers.
    pub exp_base: u32,
    /// Upper bound on experience from one battle.
    pub max_exp: u32,
    /// Experience multiplier on victory.
    pub win_exp_multiplier: Ratio,
    /// Experience multiplier on defeat.
    pub lose_exp_multiplier: Ratio,
    /// Gold earned per point of defender power.
    pub gold_multiplier: Ratio,
    /// Fame earned per point of defender power.
    pub fame_multiplier: Ratio,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            base_damage: Fixed::from_num(100),
            damage_variance: percent(20),
            critical_rate: percent(15),
            critical_damage: percent(150),
            miss_chance: percent(10),
            exp_base: 100,
            max_exp: 10_000,
            win_exp_multiplier: Ratio::from_percent(150),
            lose_exp_multiplier: Ratio::from_percent(50),
            gold_multiplier: Ratio::from_percent(10),
            fame_multiplier: Ratio::from_percent(5),
        }
    }
}

impl BattleConfig {
    /// Builder method to set the round cap.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Builder method to set the miss chance.
    #[must_use]
    pub fn with_miss_chance(mut self, miss_chance: Fixed) -> Self {
        self.miss_chance = miss_chance;
        self
    }

    /// Builder method to set the damage variance.
    #[must_use]
    pub fn with_damage_variance(mut self, damage_variance: Fixed) -> Self {
        self.damage_variance = damage_variance;
        self
    }

    /// Check that every value is inside the range the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(BattleError::InvalidConfig(msg.to_string()));

        if self.max_rounds == 0 {
            return invalid("max_rounds must be at least 1");
        }
        if self.base_damage < Fixed::ZERO {
            return invalid("base_damage must be non-negative");
        }
        if self.damage_variance < Fixed::ZERO || self.damage_variance >= Fixed::ONE {
            return invalid("damage_variance must be in [0, 1)");
        }
        if self.critical_rate < Fixed::ZERO || self.critical_rate > Fixed::ONE {
            return invalid("critical_rate must be in [0, 1]");
        }
        if self.critical_damage < Fixed::ONE {
            return invalid("critical_damage must be at least 1");
        }
        if self.miss_chance < Fixed::ZERO || self.miss_chance > Fixed::ONE {
            return invalid("miss_chance must be in [0, 1]");
        }
        if self.max_exp == 0 {
            return invalid("max_exp must be at least 1");
        }
        if self.win_exp_multiplier < self.lose_exp_multiplier {
            return invalid("win_exp_multiplier must not be below lose_exp_multiplier");
        }
        Ok(())
    }

    /// Parse and validate a config from RON text.
    ///
    /// `source` labels the text in error messages (usually a file path).
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::DataParseError`] on malformed RON and
    /// [`BattleError::InvalidConfig`] when a value is out of range.
    pub fn from_ron_str(source: &str, text: &str) -> Result<Self> {
        let config: Self = parse_ron(source, text)?;
        config.validate()?;
        Ok(config)
    }
}
