//! Hero stat scaling.
//!
//! Persisted heroes store base stats plus a quality (rarity tier) and a
//! level. Both multiply the base stats before a battle:
//!
//! ```text
//! quality_bonus = 1 + (quality - 1) × 0.2
//! level_bonus   = 1 + (level - 1) × 0.1
//! stat          = floor(base × quality_bonus × level_bonus)
//! ```
//!
//! Bonuses are tracked as whole percentages so the scaled stats are exact.

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::error::Result;
use crate::math::Fixed;
use crate::power::{estimate_power, PowerProfile, BASE_QUALITY_PERCENT};
use crate::unit::CombatUnit;

/// Quality bonus per tier above 1, in percent.
pub const QUALITY_STEP_PERCENT: u32 = 20;

/// Level bonus per level above 1, in percent.
pub const LEVEL_STEP_PERCENT: u32 = 10;

/// A persisted hero as the battle engine sees it.
///
/// # Example RON
///
/// ```ron
/// HeroProfile(
///     id: 7,
///     name: "Zhao Yun",
///     attack: 18,
///     defense: 12,
///     hp: 150,
///     quality: 3,
///     level: 10,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroProfile {
    /// Hero identifier, reused as the combat unit id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Base attack before scaling.
    #[serde(default = "default_attack")]
    pub attack: u32,
    /// Base defense before scaling.
    #[serde(default = "default_defense")]
    pub defense: u32,
    /// Base hit points before scaling.
    #[serde(default = "default_hp")]
    pub hp: u32,
    /// Rarity tier, starting at 1.
    #[serde(default = "default_tier")]
    pub quality: u32,
    /// Level, starting at 1.
    #[serde(default = "default_tier")]
    pub level: u32,
    /// Turn-order key; not scaled.
    #[serde(default)]
    pub speed: u32,
    /// Crit chance; `None` inherits [`BattleConfig::critical_rate`].
    #[serde(default)]
    pub crit_rate: Option<Fixed>,
    /// Crit multiplier; `None` means 1.
    #[serde(default)]
    pub crit_damage: Option<Fixed>,
    /// Skill identifiers.
    #[serde(default)]
    pub skills: Vec<u32>,
}

const fn default_attack() -> u32 {
    10
}

const fn default_defense() -> u32 {
    8
}

const fn default_hp() -> u32 {
    100
}

const fn default_tier() -> u32 {
    1
}

impl HeroProfile {
    /// Create a quality 1, level 1 hero.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, attack: u32, defense: u32, hp: u32) -> Self {
        Self {
            id,
            name: name.into(),
            attack,
            defense,
            hp,
            quality: 1,
            level: 1,
            speed: 0,
            crit_rate: None,
            crit_damage: None,
            skills: Vec::new(),
        }
    }

    /// Builder method to set quality and level.
    #[must_use]
    pub const fn with_grade(mut self, quality: u32, level: u32) -> Self {
        self.quality = quality;
        self.level = level;
        self
    }

    /// Quality multiplier in percent. Tiers below 1 count as 1.
    #[must_use]
    pub const fn quality_percent(&self) -> u32 {
        step_percent(self.quality, QUALITY_STEP_PERCENT)
    }

    /// Level multiplier in percent. Levels below 1 count as 1.
    #[must_use]
    pub const fn level_percent(&self) -> u32 {
        step_percent(self.level, LEVEL_STEP_PERCENT)
    }

    /// Attack after quality and level scaling.
    #[must_use]
    pub fn scaled_attack(&self) -> u32 {
        self.scale(self.attack)
    }

    /// Defense after quality and level scaling.
    #[must_use]
    pub fn scaled_defense(&self) -> u32 {
        self.scale(self.defense)
    }

    /// Hit points after quality and level scaling.
    #[must_use]
    pub fn scaled_hp(&self) -> u32 {
        self.scale(self.hp)
    }

    /// Scaled stats with the quality premium, for power estimation.
    #[must_use]
    pub fn power_profile(&self) -> PowerProfile {
        PowerProfile {
            attack: self.scaled_attack(),
            defense: self.scaled_defense(),
            hp: self.scaled_hp(),
            quality_bonus: self.quality_percent(),
        }
    }

    /// Build the combat unit this hero fights as.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BattleError::InvalidUnit`] if the scaled hp is zero.
    pub fn to_combat_unit(&self, config: &BattleConfig) -> Result<CombatUnit> {
        let unit = CombatUnit::new(
            self.id,
            self.name.clone(),
            self.scaled_attack(),
            self.scaled_defense(),
            self.scaled_hp(),
        )?
        .with_speed(self.speed)
        .with_crit(
            self.crit_rate.unwrap_or(config.critical_rate),
            self.crit_damage.unwrap_or(Fixed::ONE),
        )
        .with_skills(self.skills.clone());
        Ok(unit)
    }

    fn scale(&self, base: u32) -> u32 {
        let scaled = u64::from(base)
            * u64::from(self.quality_percent())
            * u64::from(self.level_percent())
            / u64::from(BASE_QUALITY_PERCENT * BASE_QUALITY_PERCENT);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }
}

const fn step_percent(tier: u32, step: u32) -> u32 {
    BASE_QUALITY_PERCENT.saturating_add(tier.saturating_sub(1).saturating_mul(step))
}

/// Total power of a hero roster.
#[must_use]
pub fn hero_power(heroes: &[HeroProfile]) -> u32 {
    let profiles: Vec<PowerProfile> = heroes.iter().map(HeroProfile::power_profile).collect();
    estimate_power(&profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_hero_unscaled() {
        let hero = HeroProfile::new(1, "Recruit", 10, 8, 100);
        assert_eq!(hero.quality_percent(), 100);
        assert_eq!(hero.level_percent(), 100);
        assert_eq!(hero.scaled_attack(), 10);
        assert_eq!(hero.power_profile().power(), 28);
    }

    #[test]
    fn test_quality_and_level_scaling() {
        // quality 3 -> 1.4, level 11 -> 2.0
        let hero = HeroProfile::new(1, "Veteran", 10, 8, 100).with_grade(3, 11);
        assert_eq!(hero.scaled_attack(), 28);
        assert_eq!(hero.scaled_defense(), 22);
        assert_eq!(hero.scaled_hp(), 280);
        // (28 + 22 + 28) * 1.4 = 109.2
        assert_eq!(hero.power_profile().power(), 109);
    }

    #[test]
    fn test_scaling_floors() {
        // 7 * 1.2 * 1.1 = 9.24
        let hero = HeroProfile::new(1, "a", 7, 0, 1).with_grade(2, 2);
        assert_eq!(hero.scaled_attack(), 9);
    }

    #[test]
    fn test_zero_grades_treated_as_one() {
        let hero = HeroProfile::new(1, "a", 10, 8, 100).with_grade(0, 0);
        assert_eq!(hero.quality_percent(), 100);
        assert_eq!(hero.scaled_attack(), 10);
    }

    #[test]
    fn test_combat_unit_inherits_config_crit() {
        let config = BattleConfig::default();
        let unit = HeroProfile::new(4, "a", 10, 8, 100)
            .to_combat_unit(&config)
            .unwrap();
        assert_eq!(unit.id, 4);
        assert_eq!(unit.crit_rate, config.critical_rate);
        assert_eq!(unit.crit_damage, Fixed::ONE);
        assert_eq!(unit.hp, unit.max_hp);
    }

    #[test]
    fn test_zero_hp_hero_rejected() {
        let hero = HeroProfile::new(1, "a", 10, 8, 0);
        assert!(hero.to_combat_unit(&BattleConfig::default()).is_err());
    }

    #[test]
    fn test_ron_defaults() {
        let hero: HeroProfile = ron::from_str(r#"(id: 2, name: "Scout")"#).unwrap();
        assert_eq!(hero.attack, 10);
        assert_eq!(hero.defense, 8);
        assert_eq!(hero.hp, 100);
        assert_eq!(hero.quality, 1);
        assert_eq!(hero_power(&[hero]), 28);
    }
}
