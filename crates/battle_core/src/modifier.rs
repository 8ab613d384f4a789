//! Damage modifiers: the extension point for skills and effects.
//!
//! The simulator never hardcodes skill logic. It hands every attack's
//! post-defense damage to a [`DamageModifier`], which may scale it based on
//! either unit's skill list. Closures with the right signature are modifiers
//! too, so one-off effects need no new type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::Fixed;
use crate::unit::CombatUnit;

/// Adjusts damage for one attacker/defender pair.
pub trait DamageModifier {
    /// Return the adjusted damage. Returning `damage` unchanged means the
    /// modifier had no effect on this attack.
    fn modify(&self, attacker: &CombatUnit, defender: &CombatUnit, damage: Fixed) -> Fixed;
}

/// Modifier that leaves every attack untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoModifier;

impl DamageModifier for NoModifier {
    fn modify(&self, _attacker: &CombatUnit, _defender: &CombatUnit, damage: Fixed) -> Fixed {
        damage
    }
}

impl<F> DamageModifier for F
where
    F: Fn(&CombatUnit, &CombatUnit, Fixed) -> Fixed,
{
    fn modify(&self, attacker: &CombatUnit, defender: &CombatUnit, damage: Fixed) -> Fixed {
        self(attacker, defender, damage)
    }
}

/// Table-driven skill effects keyed by skill id.
///
/// Attack boosts on the attacker add to outgoing damage; defense boosts on
/// the defender subtract from it. Boosts are fractions (`0.2` = 20%) and
/// stack additively. The combined multiplier never drops below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBoosts {
    /// Outgoing damage bonus per attacker skill.
    #[serde(default)]
    pub attack: BTreeMap<u32, Fixed>,
    /// Incoming damage reduction per defender skill.
    #[serde(default)]
    pub defense: BTreeMap<u32, Fixed>,
}

impl SkillBoosts {
    /// Builder method to register an attack boost.
    #[must_use]
    pub fn with_attack_boost(mut self, skill: u32, boost: Fixed) -> Self {
        self.attack.insert(skill, boost);
        self
    }

    /// Builder method to register a defense boost.
    #[must_use]
    pub fn with_defense_boost(mut self, skill: u32, boost: Fixed) -> Self {
        self.defense.insert(skill, boost);
        self
    }

    fn total(table: &BTreeMap<u32, Fixed>, skills: &[u32]) -> Fixed {
        skills
            .iter()
            .filter_map(|id| table.get(id))
            .fold(Fixed::ZERO, |acc, boost| acc.saturating_add(*boost))
    }
}

impl DamageModifier for SkillBoosts {
    fn modify(&self, attacker: &CombatUnit, defender: &CombatUnit, damage: Fixed) -> Fixed {
        let bonus = Self::total(&self.attack, &attacker.skills);
        let guard = Self::total(&self.defense, &defender.skills);
        if bonus == Fixed::ZERO && guard == Fixed::ZERO {
            return damage;
        }
        let multiplier = Fixed::ONE
            .saturating_add(bonus)
            .saturating_sub(guard)
            .max(Fixed::ZERO);
        damage.saturating_mul(multiplier)
    }
}
