//! Per-attack damage calculation.
//!
//! Formula:
//! ```text
//! Base        = base_damage × attack / 100
//! Reduction   = defense / (defense + 1000)        (always < 1)
//! Mitigated   = Base × (1 - Reduction)
//! Modified    = DamageModifier(Mitigated)
//! Varied      = Modified × [1 - variance, 1 + variance]
//! Critical    = Varied × crit_damage × config.critical_damage   (chance: crit_rate)
//! Final       = floor(Critical), minimum 1; 0 on a miss          (chance: miss_chance)
//! ```
//!
//! The random part is split out into [`DamageRolls`] so the arithmetic in
//! [`resolve_damage`] is a pure function of its inputs.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::math::{floor_u32, from_stat, roll_fraction, Fixed};
use crate::modifier::{DamageModifier, NoModifier};
use crate::unit::CombatUnit;

/// Defense at which damage is halved.
pub const DEFENSE_SCALE: u32 = 1000;

/// Minimum damage floor - attacks that land always deal at least 1 damage.
pub const MIN_DAMAGE: u32 = 1;

/// Result of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    /// Damage dealt; 0 only on a miss.
    pub damage: u32,
    /// Whether the attack was a critical hit. Always false on a miss.
    pub is_crit: bool,
    /// Whether the attack missed.
    pub is_miss: bool,
    /// Whether a damage modifier changed this attack.
    pub modified: bool,
}

/// The three random fractions one attack consumes, each in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRolls {
    /// Position inside the variance band (0 = lowest, 1 = highest).
    pub variance: Fixed,
    /// Compared against the attacker's crit rate.
    pub crit: Fixed,
    /// Compared against the configured miss chance.
    pub miss: Fixed,
}

impl DamageRolls {
    /// Draw rolls in the fixed order variance, crit, miss.
    pub fn draw<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let variance = roll_fraction(rng);
        let crit = roll_fraction(rng);
        let miss = roll_fraction(rng);
        Self {
            variance,
            crit,
            miss,
        }
    }

    /// Rolls that land at the middle of the variance band with no crit and
    /// no miss.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            variance: Fixed::from_num(0.5),
            crit: Fixed::MAX,
            miss: Fixed::MAX,
        }
    }
}

/// Fraction of incoming damage absorbed by `defense`.
///
/// Diminishing returns; stays below 1 for any defense that fits the
/// fixed-point range.
#[must_use]
pub fn defense_reduction(defense: u32) -> Fixed {
    let defense = from_stat(defense);
    let scale = Fixed::from_num(DEFENSE_SCALE);
    defense / defense.saturating_add(scale)
}

/// Compute the damage of one attack, drawing rolls from `rng`.
pub fn compute_damage<R: RngCore + ?Sized>(
    attacker: &CombatUnit,
    defender: &CombatUnit,
    config: &BattleConfig,
    rng: &mut R,
) -> DamageRoll {
    compute_damage_with(attacker, defender, config, &NoModifier, rng)
}

/// Like [`compute_damage`], passing the mitigated damage through `modifier`.
pub fn compute_damage_with<R, M>(
    attacker: &CombatUnit,
    defender: &CombatUnit,
    config: &BattleConfig,
    modifier: &M,
    rng: &mut R,
) -> DamageRoll
where
    R: RngCore + ?Sized,
    M: DamageModifier + ?Sized,
{
    let rolls = DamageRolls::draw(rng);
    resolve_damage(attacker, defender, config, modifier, rolls)
}

/// Deterministic core of the damage formula.
pub fn resolve_damage<M: DamageModifier + ?Sized>(
    attacker: &CombatUnit,
    defender: &CombatUnit,
    config: &BattleConfig,
    modifier: &M,
    rolls: DamageRolls,
) -> DamageRoll {
    // Step 1: Scale base damage by attack
    let base =
        config.base_damage.saturating_mul(from_stat(attacker.attack)) / Fixed::from_num(100);

    // Step 2: Defense reduction
    let mitigated = base.saturating_mul(Fixed::ONE - defense_reduction(defender.defense));

    // Step 3: Skill and effect hooks
    let modified = modifier.modify(attacker, defender, mitigated);

    // Step 4: Symmetric variance
    let variance = config.damage_variance;
    let spread = rolls
        .variance
        .saturating_mul(variance)
        .saturating_mul(Fixed::from_num(2));
    let mut damage = modified.saturating_mul(Fixed::ONE - variance + spread);

    // Step 5: Critical hit
    let mut is_crit = rolls.crit < attacker.crit_rate;
    if is_crit {
        let multiplier = attacker.crit_damage.saturating_mul(config.critical_damage);
        damage = damage.saturating_mul(multiplier);
    }

    // Step 6: Miss, then floor with minimum damage
    let is_miss = rolls.miss < config.miss_chance;
    let final_damage = if is_miss {
        is_crit = false;
        0
    } else {
        floor_u32(damage).max(MIN_DAMAGE)
    };

    DamageRoll {
        damage: final_damage,
        is_crit,
        is_miss,
        modified: modified != mitigated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::percent;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit(attack: u32, defense: u32) -> CombatUnit {
        CombatUnit::new(1, "u", attack, defense, 100).unwrap()
    }

    fn no_variance() -> BattleConfig {
        BattleConfig::default().with_damage_variance(Fixed::ZERO)
    }

    #[test]
    fn test_defense_reduction_diminishing() {
        assert_eq!(defense_reduction(0), Fixed::ZERO);
        assert_eq!(defense_reduction(1000), Fixed::from_num(0.5));
        assert!(defense_reduction(u32::MAX) <= Fixed::ONE);
        assert!(defense_reduction(3000) > defense_reduction(1000));
    }

    #[test]
    fn test_base_damage_no_defense() {
        let roll = resolve_damage(
            &unit(100, 0),
            &unit(0, 0),
            &no_variance(),
            &NoModifier,
            DamageRolls::neutral(),
        );
        assert_eq!(roll.damage, 100);
        assert!(!roll.is_crit);
        assert!(!roll.is_miss);
        assert!(!roll.modified);
    }

    #[test]
    fn test_defense_halves_at_scale() {
        let roll = resolve_damage(
            &unit(200, 0),
            &unit(0, 1000),
            &no_variance(),
            &NoModifier,
            DamageRolls::neutral(),
        );
        // 100 * 200/100 * (1 - 0.5) = 100
        assert_eq!(roll.damage, 100);
    }

    #[test]
    fn test_variance_band_edges() {
        let config = BattleConfig::default().with_damage_variance(percent(25));
        let low = DamageRolls {
            variance: Fixed::ZERO,
            ..DamageRolls::neutral()
        };
        let high = DamageRolls {
            variance: Fixed::ONE,
            ..DamageRolls::neutral()
        };
        let attacker = unit(100, 0);
        let defender = unit(0, 0);
        assert_eq!(resolve_damage(&attacker, &defender, &config, &NoModifier, low).damage, 75);
        assert_eq!(resolve_damage(&attacker, &defender, &config, &NoModifier, high).damage, 125);
    }

    #[test]
    fn test_critical_hit_multiplies() {
        let attacker = unit(100, 0).with_crit(Fixed::ONE, Fixed::from_num(2));
        let rolls = DamageRolls {
            crit: Fixed::ZERO,
            ..DamageRolls::neutral()
        };
        let roll = resolve_damage(&attacker, &unit(0, 0), &no_variance(), &NoModifier, rolls);
        assert!(roll.is_crit);
        // 100 * 2 (unit) * 1.5 (config)
        assert_eq!(roll.damage, 300);
    }

    #[test]
    fn test_zero_crit_rate_never_crits() {
        let rolls = DamageRolls {
            crit: Fixed::ZERO,
            ..DamageRolls::neutral()
        };
        let roll = resolve_damage(&unit(100, 0), &unit(0, 0), &no_variance(), &NoModifier, rolls);
        assert!(!roll.is_crit);
    }

    #[test]
    fn test_miss_zeroes_damage() {
        let attacker = unit(100, 0).with_crit(Fixed::ONE, Fixed::from_num(2));
        let rolls = DamageRolls {
            variance: Fixed::from_num(0.5),
            crit: Fixed::ZERO,
            miss: Fixed::ZERO,
        };
        let roll = resolve_damage(&attacker, &unit(0, 0), &no_variance(), &NoModifier, rolls);
        assert!(roll.is_miss);
        assert!(!roll.is_crit);
        assert_eq!(roll.damage, 0);
    }

    #[test]
    fn test_minimum_damage_is_one() {
        let roll = resolve_damage(
            &unit(0, 0),
            &unit(0, 50_000),
            &no_variance(),
            &NoModifier,
            DamageRolls::neutral(),
        );
        assert_eq!(roll.damage, MIN_DAMAGE);
    }

    #[test]
    fn test_modifier_flagged() {
        let halve = |_: &CombatUnit, _: &CombatUnit, d: Fixed| d / Fixed::from_num(2);
        let roll = resolve_damage(
            &unit(100, 0),
            &unit(0, 0),
            &no_variance(),
            &halve,
            DamageRolls::neutral(),
        );
        assert!(roll.modified);
        assert_eq!(roll.damage, 50);
    }

    #[test]
    fn test_compute_damage_seeded_determinism() {
        let attacker = unit(150, 20).with_crit(percent(30), Fixed::from_num(2));
        let defender = unit(80, 300);
        let config = BattleConfig::default();

        let mut rng1 = StdRng::seed_from_u64(99);
        let mut rng2 = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let a = compute_damage(&attacker, &defender, &config, &mut rng1);
            let b = compute_damage(&attacker, &defender, &config, &mut rng2);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_compute_damage_floor_holds() {
        let attacker = unit(1, 0);
        let defender = unit(0, 9_000);
        let config = BattleConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let roll = compute_damage(&attacker, &defender, &config, &mut rng);
            if roll.is_miss {
                assert_eq!(roll.damage, 0);
            } else {
                assert!(roll.damage >= MIN_DAMAGE);
            }
        }
    }
}
