//! Fixed-point math utilities for deterministic battle resolution.
//!
//! All battle math uses fixed-point arithmetic so that a seeded battle
//! replays to the exact same log on every platform. Floating-point
//! operations can produce different results on different CPUs.
//!
//! Reward payouts use [`Ratio`] instead, an exact decimal multiplier in
//! basis points, because their floors must match decimal arithmetic.

use std::fmt;
use std::str::FromStr;

use fixed::types::I32F32;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};

/// Fixed-point number type for all battle math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
///
/// Serializes as a decimal string in human-readable formats (RON, JSON)
/// and as raw bits in binary formats.
pub type Fixed = I32F32;

/// Build a fraction from a percentage, e.g. `percent(40)` is `0.4`.
#[must_use]
pub fn percent(value: i32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Convert an unsigned stat into fixed-point, saturating at `Fixed::MAX`.
#[must_use]
pub fn from_stat(value: u32) -> Fixed {
    Fixed::saturating_from_num(value)
}

/// Floor a fixed-point value into a `u32`, clamping negatives to zero.
#[must_use]
pub fn floor_u32(value: Fixed) -> u32 {
    value.floor().saturating_to_num::<u32>()
}

/// Draw a uniformly distributed fraction in `[0, 1)`.
///
/// Consumes exactly one `u32` from the generator; its bits become the
/// fractional part of the result.
pub fn roll_fraction<R: RngCore + ?Sized>(rng: &mut R) -> Fixed {
    Fixed::from_bits(i64::from(rng.next_u32()))
}

/// Exact ratio `numerator / (numerator + other)` as a fraction in `[0, 1]`.
///
/// Returns `None` when both inputs are zero.
#[must_use]
pub fn share_of(numerator: u32, other: u32) -> Option<Fixed> {
    let total = u64::from(numerator) + u64::from(other);
    if total == 0 {
        return None;
    }
    let bits = (u128::from(numerator) << Fixed::FRAC_NBITS) / u128::from(total);
    // bits <= 2^32, which always fits the integer part
    Some(Fixed::from_bits(bits as i64))
}

/// Basis points in one whole [`Ratio`].
pub const RATIO_SCALE: u32 = 10_000;

/// Non-negative multiplier stored in basis points (`10_000` = ×1).
///
/// Used where a result is floored and must match decimal arithmetic
/// exactly, e.g. `0.1 * 2000 = 200`. Binary fixed-point cannot hold `0.1`,
/// so those products could land one below the decimal answer.
///
/// Serializes as a decimal string with at most four fractional digits,
/// matching how [`Fixed`] values are written in data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ratio(u32);

impl Ratio {
    /// Zero.
    pub const ZERO: Self = Self(0);
    /// One.
    pub const ONE: Self = Self(RATIO_SCALE);

    /// Build from basis points.
    #[must_use]
    pub const fn from_basis_points(bps: u32) -> Self {
        Self(bps)
    }

    /// Build from a whole percentage, saturating.
    #[must_use]
    pub const fn from_percent(value: u32) -> Self {
        Self(value.saturating_mul(100))
    }

    /// Raw basis points.
    #[must_use]
    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// `floor(value * self)`, saturating at `u32::MAX`.
    #[must_use]
    pub fn apply(self, value: u32) -> u32 {
        scale_floor(u128::from(value), &[self], 1)
    }
}

/// `floor(value * r1 * r2 * ... / divisor)` evaluated exactly, saturating at
/// `u32::MAX`. A zero divisor yields `u32::MAX` unless the product is zero.
#[must_use]
pub fn scale_floor(value: u128, ratios: &[Ratio], divisor: u128) -> u32 {
    let mut numerator = value;
    let mut denominator = divisor;
    for ratio in ratios {
        numerator = numerator.saturating_mul(u128::from(ratio.0));
        denominator = denominator.saturating_mul(u128::from(RATIO_SCALE));
    }
    if numerator == 0 {
        return 0;
    }
    numerator
        .checked_div(denominator)
        .map_or(u32::MAX, |q| u32::try_from(q).unwrap_or(u32::MAX))
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / RATIO_SCALE;
        let frac = self.0 % RATIO_SCALE;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:04}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Ratio {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            BattleError::InvalidConfig(format!(
                "invalid ratio {s:?}: expected a non-negative decimal with at most 4 fractional digits"
            ))
        };

        let (whole, frac) = s.trim().split_once('.').unwrap_or((s.trim(), ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 4 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac: u32 = if frac.is_empty() {
            0
        } else {
            format!("{frac:0<4}").parse().map_err(|_| invalid())?
        };

        whole
            .checked_mul(RATIO_SCALE)
            .and_then(|bps| bps.checked_add(frac))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Ratio {
    type Error = BattleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Ratio> for String {
    fn from(value: Ratio) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_percent() {
        assert_eq!(percent(50), Fixed::from_num(0.5));
        assert_eq!(percent(100), Fixed::ONE);
        assert_eq!(percent(0), Fixed::ZERO);
    }

    #[test]
    fn test_floor_u32() {
        assert_eq!(floor_u32(Fixed::from_num(7.99)), 7);
        assert_eq!(floor_u32(Fixed::from_num(-3)), 0);
        assert_eq!(floor_u32(Fixed::ZERO), 0);
    }

    #[test]
    fn test_from_stat_saturates() {
        assert_eq!(from_stat(u32::MAX), Fixed::MAX);
        assert_eq!(from_stat(42), Fixed::from_num(42));
    }

    #[test]
    fn test_roll_fraction_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let r = roll_fraction(&mut rng);
            assert!(r >= Fixed::ZERO);
            assert!(r < Fixed::ONE);
        }
    }

    #[test]
    fn test_share_of() {
        assert_eq!(share_of(0, 0), None);
        assert_eq!(share_of(1000, 1000), Some(Fixed::from_num(0.5)));
        assert_eq!(share_of(5, 0), Some(Fixed::ONE));
        assert_eq!(share_of(0, 5), Some(Fixed::ZERO));
        assert_eq!(share_of(u32::MAX, u32::MAX), Some(Fixed::from_num(0.5)));
    }

    #[test]
    fn test_ratio_parses_decimal_exactly() {
        assert_eq!("0.1".parse::<Ratio>().unwrap(), Ratio::from_percent(10));
        assert_eq!("1.5".parse::<Ratio>().unwrap(), Ratio::from_basis_points(15_000));
        assert_eq!("2".parse::<Ratio>().unwrap(), Ratio::from_percent(200));
        assert_eq!(".05".parse::<Ratio>().unwrap(), Ratio::from_percent(5));
        assert_eq!("0.0001".parse::<Ratio>().unwrap().basis_points(), 1);
    }

    #[test]
    fn test_ratio_rejects_bad_input() {
        for text in ["", ".", "-0.1", "0.12345", "abc", "1.2x", "999999999"] {
            assert!(text.parse::<Ratio>().is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn test_ratio_display() {
        assert_eq!(Ratio::from_percent(10).to_string(), "0.1");
        assert_eq!(Ratio::from_percent(150).to_string(), "1.5");
        assert_eq!(Ratio::ONE.to_string(), "1");
        assert_eq!(Ratio::from_basis_points(10_005).to_string(), "1.0005");
    }

    #[test]
    fn test_ratio_apply_is_exact() {
        assert_eq!(Ratio::from_percent(10).apply(2000), 200);
        assert_eq!(Ratio::from_percent(5).apply(2000), 100);
        assert_eq!(Ratio::from_percent(10).apply(1999), 199);
        assert_eq!(Ratio::from_percent(300).apply(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_scale_floor_chains_ratios() {
        let fame = Ratio::from_percent(5);
        let tenth = Ratio::from_percent(10);
        assert_eq!(scale_floor(2000, &[fame, tenth], 1), 10);
        assert_eq!(scale_floor(7, &[], 2), 3);
        assert_eq!(scale_floor(0, &[], 0), 0);
    }

    #[test]
    fn test_fixed_determinism() {
        // Same operations must produce identical results
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a, b);

        let result1 = a * Fixed::from_num(7);
        let result2 = b * Fixed::from_num(7);
        assert_eq!(result1, result2);
    }
}
