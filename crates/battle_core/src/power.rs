//! Power estimation and pre-battle win-rate hints.
//!
//! Power collapses a roster into one comparable number. It feeds the
//! validator, reward scaling and the win-rate hint shown before a fight.

use serde::{Deserialize, Serialize};

use crate::math::{percent, share_of, Fixed};
use crate::unit::CombatUnit;

/// Lowest win rate ever reported.
pub const MIN_WIN_RATE_PERCENT: i32 = 5;

/// Highest win rate ever reported.
pub const MAX_WIN_RATE_PERCENT: i32 = 95;

/// Quality bonus of a common unit, in percent.
pub const BASE_QUALITY_PERCENT: u32 = 100;

/// Effective stats of one unit for power purposes.
///
/// Stats are expected to already include quality and level scaling;
/// the quality bonus is applied once more on top, as a rarity premium.
/// It is kept as a whole percentage (`120` = ×1.2) so power stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerProfile {
    /// Effective attack.
    pub attack: u32,
    /// Effective defense.
    pub defense: u32,
    /// Effective hit points.
    pub hp: u32,
    /// Rarity multiplier in percent, 100 for common units.
    pub quality_bonus: u32,
}

impl PowerProfile {
    /// Power contributed by this unit: `floor((atk + def + hp / 10) × quality)`.
    #[must_use]
    pub fn power(&self) -> u32 {
        // (10 * (atk + def) + hp) * percent / 1000, all in integers
        let tenths = 10 * (u128::from(self.attack) + u128::from(self.defense))
            + u128::from(self.hp);
        let power = tenths * u128::from(self.quality_bonus) / 1000;
        u32::try_from(power).unwrap_or(u32::MAX)
    }
}

impl From<&CombatUnit> for PowerProfile {
    fn from(unit: &CombatUnit) -> Self {
        Self {
            attack: unit.attack,
            defense: unit.defense,
            hp: unit.max_hp,
            quality_bonus: BASE_QUALITY_PERCENT,
        }
    }
}

/// Sum the power of every profile in a roster, saturating at `u32::MAX`.
#[must_use]
pub fn estimate_power(units: &[PowerProfile]) -> u32 {
    units
        .iter()
        .fold(0u32, |total, unit| total.saturating_add(unit.power()))
}

/// Power of a roster of combat units, each with the base quality bonus.
#[must_use]
pub fn roster_power(units: &[CombatUnit]) -> u32 {
    units
        .iter()
        .fold(0u32, |total, unit| total.saturating_add(PowerProfile::from(unit).power()))
}

/// Pre-battle win probability for the attacker, in `[0.05, 0.95]`.
///
/// `0.5 + (attacker / (attacker + defender) - 0.5) × 0.4`, clamped. Equal
/// powers (including both zero) give exactly 0.5.
#[must_use]
pub fn estimate_win_rate(attacker_power: u32, defender_power: u32) -> Fixed {
    let half = Fixed::from_num(0.5);
    let Some(share) = share_of(attacker_power, defender_power) else {
        return half;
    };
    let rate = half + (share - half) * percent(40);
    rate.clamp(percent(MIN_WIN_RATE_PERCENT), percent(MAX_WIN_RATE_PERCENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(attack: u32, defense: u32, hp: u32, quality_bonus: u32) -> PowerProfile {
        PowerProfile {
            attack,
            defense,
            hp,
            quality_bonus,
        }
    }

    #[test]
    fn test_profile_power() {
        // (10 + 8 + 100/10) * 1 = 28
        assert_eq!(profile(10, 8, 100, 100).power(), 28);
        // (10 + 8 + 105/10) * 1.5 = 42.75 -> 42
        assert_eq!(profile(10, 8, 105, 150).power(), 42);
        // (14 + 11 + 140/10) * 1.4 = 54.6 -> 54
        assert_eq!(profile(14, 11, 140, 140).power(), 54);
    }

    #[test]
    fn test_profile_power_saturates() {
        assert_eq!(profile(u32::MAX, u32::MAX, u32::MAX, 200).power(), u32::MAX);
    }

    #[test]
    fn test_estimate_power_sums_roster() {
        let roster = [profile(10, 8, 100, 100), profile(20, 10, 200, 100)];
        assert_eq!(estimate_power(&roster), 28 + 50);
        assert_eq!(estimate_power(&[]), 0);
    }

    #[test]
    fn test_roster_power_uses_max_hp() {
        let mut unit = CombatUnit::new(1, "a", 10, 8, 100).unwrap();
        unit.take_damage(90);
        assert_eq!(roster_power(&[unit]), 28);
    }

    #[test]
    fn test_even_powers_give_half() {
        assert_eq!(estimate_win_rate(1000, 1000), Fixed::from_num(0.5));
        assert_eq!(estimate_win_rate(0, 0), Fixed::from_num(0.5));
    }

    #[test]
    fn test_win_rate_bounds() {
        let low = estimate_win_rate(0, 5000);
        let high = estimate_win_rate(5000, 0);
        assert!(low >= percent(MIN_WIN_RATE_PERCENT));
        assert!(high <= percent(MAX_WIN_RATE_PERCENT));
        // Formula extremes are 0.3 and 0.7
        assert!(low < Fixed::from_num(0.31));
        assert!(high > Fixed::from_num(0.69));
    }

    #[test]
    fn test_underdog_rate() {
        // 0.5 + (100/2100 - 0.5) * 0.4 ≈ 0.319
        let rate = estimate_win_rate(100, 2000);
        assert!(rate > Fixed::from_num(0.318));
        assert!(rate < Fixed::from_num(0.32));
    }

    #[test]
    fn test_win_rate_monotonic_in_attacker_power() {
        let mut previous = Fixed::ZERO;
        for attacker in (0..5000).step_by(250) {
            let rate = estimate_win_rate(attacker, 1000);
            assert!(rate >= previous);
            previous = rate;
        }
    }
}
