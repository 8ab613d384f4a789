//! Unit data structures for data-driven rosters.

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::error::Result;
use crate::math::Fixed;
use crate::unit::CombatUnit;

/// Data-driven combat unit definition.
///
/// Units always enter battle at full health, so only `hp` (the maximum) is
/// stored.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     id: 1,
///     name: "Spearman",
///     attack: 120,
///     defense: 40,
///     hp: 900,
///     speed: 3,
///     crit_rate: Some("0.25"),
///     skills: [101],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    /// Identifier, unique within a battle.
    pub id: u32,

    /// Display name.
    pub name: String,

    /// Offensive stat.
    pub attack: u32,

    /// Defensive stat.
    pub defense: u32,

    /// Maximum hit points.
    pub hp: u32,

    /// Turn-order key.
    #[serde(default)]
    pub speed: u32,

    /// Crit chance; `None` inherits [`BattleConfig::critical_rate`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_rate: Option<Fixed>,

    /// Crit multiplier; `None` means 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_damage: Option<Fixed>,

    /// Skill identifiers.
    #[serde(default)]
    pub skills: Vec<u32>,

    /// Board slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u8>,
}

impl UnitData {
    /// Build the combat unit described by this entry.
    ///
    /// Crit values outside their valid ranges are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BattleError::InvalidUnit`] if `hp` is zero.
    pub fn to_combat_unit(&self, config: &BattleConfig) -> Result<CombatUnit> {
        let mut unit = CombatUnit::new(
            self.id,
            self.name.clone(),
            self.attack,
            self.defense,
            self.hp,
        )?
        .with_speed(self.speed)
        .with_crit(
            self.crit_rate.unwrap_or(config.critical_rate),
            self.crit_damage.unwrap_or(Fixed::ONE),
        )
        .with_skills(self.skills.clone());
        unit.position = self.position;
        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::percent;

    fn create_test_unit() -> UnitData {
        UnitData {
            id: 3,
            name: "Archer".to_string(),
            attack: 90,
            defense: 20,
            hp: 400,
            speed: 5,
            crit_rate: None,
            crit_damage: None,
            skills: vec![7],
            position: Some(2),
        }
    }

    #[test]
    fn test_combat_unit_from_data() {
        let config = BattleConfig::default();
        let unit = create_test_unit().to_combat_unit(&config).unwrap();
        assert_eq!(unit.id, 3);
        assert_eq!(unit.hp, 400);
        assert_eq!(unit.max_hp, 400);
        assert_eq!(unit.speed, 5);
        assert_eq!(unit.crit_rate, config.critical_rate);
        assert_eq!(unit.crit_damage, Fixed::ONE);
        assert_eq!(unit.skills, vec![7]);
        assert_eq!(unit.position, Some(2));
    }

    #[test]
    fn test_explicit_crit_overrides_config() {
        let data = UnitData {
            crit_rate: Some(percent(50)),
            crit_damage: Some(Fixed::from_num(2)),
            ..create_test_unit()
        };
        let unit = data.to_combat_unit(&BattleConfig::default()).unwrap();
        assert_eq!(unit.crit_rate, Fixed::from_num(0.5));
        assert_eq!(unit.crit_damage, Fixed::from_num(2));
    }

    #[test]
    fn test_zero_hp_rejected() {
        let data = UnitData {
            hp: 0,
            ..create_test_unit()
        };
        assert!(data.to_combat_unit(&BattleConfig::default()).is_err());
    }

    #[test]
    fn test_deserialize_minimal_ron() {
        let ron_str = r#"(id: 1, name: "Spearman", attack: 120, defense: 40, hp: 900, crit_rate: Some("0.25"))"#;
        let data: UnitData = ron::from_str(ron_str).expect("Failed to parse UnitData");
        assert_eq!(data.speed, 0);
        assert_eq!(data.crit_rate, Some(Fixed::from_num(0.25)));
        assert!(data.skills.is_empty());
    }
}
