//! Combat unit definitions.
//!
//! A [`CombatUnit`] is a plain value built from persisted hero or monster
//! stats right before a battle. The simulator works on its own copies, so a
//! caller's roster is never mutated.

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::math::Fixed;

/// One fighter for the duration of a single battle.
///
/// Invariants (checked by [`CombatUnit::new`] and [`CombatUnit::validate`]):
/// - `hp <= max_hp`
/// - `crit_rate` in `[0, 1]`
/// - `crit_damage >= 1`
///
/// Attack, defense and speed are unsigned and therefore never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatUnit {
    /// Identifier, unique within a battle.
    pub id: u32,
    /// Display name copied into action records.
    pub name: String,
    /// Offensive stat; 100 attack deals `base_damage` before modifiers.
    pub attack: u32,
    /// Defensive stat with diminishing returns.
    pub defense: u32,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points. Battles always start at full health.
    pub max_hp: u32,
    /// Turn-order key within a side; faster units act first.
    pub speed: u32,
    /// Chance of a critical hit.
    pub crit_rate: Fixed,
    /// Critical-hit damage multiplier.
    pub crit_damage: Fixed,
    /// Skill identifiers, interpreted by damage modifiers.
    #[serde(default)]
    pub skills: Vec<u32>,
    /// Board slot, if the caller tracks formations.
    #[serde(default)]
    pub position: Option<u8>,
}

impl CombatUnit {
    /// Create a unit at full health with no crits, skills or position.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidUnit`] if `max_hp` is zero.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        attack: u32,
        defense: u32,
        max_hp: u32,
    ) -> Result<Self> {
        let unit = Self {
            id,
            name: name.into(),
            attack,
            defense,
            hp: max_hp,
            max_hp,
            speed: 0,
            crit_rate: Fixed::ZERO,
            crit_damage: Fixed::ONE,
            skills: Vec::new(),
            position: None,
        };
        if max_hp == 0 {
            return Err(unit.invalid("max_hp must be at least 1"));
        }
        Ok(unit)
    }

    /// Builder method to set speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder method to set critical-hit stats.
    ///
    /// Values are clamped into their valid ranges.
    #[must_use]
    pub fn with_crit(mut self, crit_rate: Fixed, crit_damage: Fixed) -> Self {
        self.crit_rate = crit_rate.clamp(Fixed::ZERO, Fixed::ONE);
        self.crit_damage = crit_damage.max(Fixed::ONE);
        self
    }

    /// Builder method to attach skill identifiers.
    #[must_use]
    pub fn with_skills(mut self, skills: Vec<u32>) -> Self {
        self.skills = skills;
        self
    }

    /// Builder method to set the board position.
    #[must_use]
    pub const fn with_position(mut self, position: u8) -> Self {
        self.position = Some(position);
        self
    }

    /// Check every invariant on a unit that was built or deserialized directly.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidUnit`] naming the broken invariant.
    pub fn validate(&self) -> Result<()> {
        if self.max_hp == 0 {
            return Err(self.invalid("max_hp must be at least 1"));
        }
        if self.hp > self.max_hp {
            return Err(self.invalid("hp exceeds max_hp"));
        }
        if self.crit_rate < Fixed::ZERO || self.crit_rate > Fixed::ONE {
            return Err(self.invalid("crit_rate must be in [0, 1]"));
        }
        if self.crit_damage < Fixed::ONE {
            return Err(self.invalid("crit_damage must be at least 1"));
        }
        Ok(())
    }

    /// Whether the unit can still act.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Whether the unit is alive but below full health.
    #[must_use]
    pub const fn is_wounded(&self) -> bool {
        self.hp > 0 && self.hp < self.max_hp
    }

    /// Apply damage, saturating at zero. Returns the remaining hp.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        self.hp = self.hp.saturating_sub(damage);
        self.hp
    }

    /// Copy of this unit restored to full health, as used at battle start.
    #[must_use]
    pub fn fresh_copy(&self) -> Self {
        Self {
            hp: self.max_hp,
            ..self.clone()
        }
    }

    fn invalid(&self, reason: &str) -> BattleError {
        BattleError::InvalidUnit {
            id: self.id,
            reason: reason.to_string(),
        }
    }
}

/// Count the living units in a roster.
#[must_use]
pub fn alive_count(units: &[CombatUnit]) -> u32 {
    units.iter().filter(|u| u.is_alive()).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::percent;

    #[test]
    fn test_new_unit_full_health() {
        let unit = CombatUnit::new(1, "Guan Yu", 120, 40, 900).unwrap();
        assert_eq!(unit.hp, 900);
        assert!(unit.is_alive());
        assert!(!unit.is_wounded());
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn test_zero_max_hp_rejected() {
        let err = CombatUnit::new(7, "Ghost", 10, 10, 0).unwrap_err();
        assert!(matches!(err, BattleError::InvalidUnit { id: 7, .. }));
    }

    #[test]
    fn test_with_crit_clamps() {
        let unit = CombatUnit::new(1, "a", 10, 0, 10)
            .unwrap()
            .with_crit(Fixed::from_num(3), percent(50));
        assert_eq!(unit.crit_rate, Fixed::ONE);
        assert_eq!(unit.crit_damage, Fixed::ONE);
    }

    #[test]
    fn test_validate_catches_overhealed_unit() {
        let mut unit = CombatUnit::new(1, "a", 10, 0, 10).unwrap();
        unit.hp = 11;
        assert!(unit.validate().is_err());
    }

    #[test]
    fn test_take_damage_saturates() {
        let mut unit = CombatUnit::new(1, "a", 10, 0, 10).unwrap();
        assert_eq!(unit.take_damage(4), 6);
        assert!(unit.is_wounded());
        assert_eq!(unit.take_damage(100), 0);
        assert!(!unit.is_alive());
        assert!(!unit.is_wounded());
    }

    #[test]
    fn test_fresh_copy_resets_hp() {
        let mut unit = CombatUnit::new(1, "a", 10, 0, 50).unwrap();
        unit.take_damage(30);
        let copy = unit.fresh_copy();
        assert_eq!(copy.hp, 50);
        assert_eq!(unit.hp, 20);
    }

    #[test]
    fn test_alive_count() {
        let mut a = CombatUnit::new(1, "a", 10, 0, 5).unwrap();
        let b = CombatUnit::new(2, "b", 10, 0, 5).unwrap();
        a.take_damage(5);
        assert_eq!(alive_count(&[a, b]), 1);
        assert_eq!(alive_count(&[]), 0);
    }
}
