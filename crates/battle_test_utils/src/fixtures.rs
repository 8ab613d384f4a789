//! Test fixtures and helpers.
//!
//! Pre-built units, rosters and requests for consistent testing.

use battle_core::config::BattleConfig;
use battle_core::report::{BattleEngine, BattleRequest};
use battle_core::unit::CombatUnit;
use fixed::types::I32F32;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real battle code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Seeded RNG for reproducible tests.
#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Build a unit at full health.
///
/// # Panics
///
/// Panics if `hp` is zero.
#[must_use]
pub fn unit(id: u32, attack: u32, defense: u32, hp: u32) -> CombatUnit {
    CombatUnit::new(id, format!("unit-{id}"), attack, defense, hp)
        .expect("fixture units need hp > 0")
}

/// Build `count` identical units with consecutive ids from `first_id`.
#[must_use]
pub fn roster(first_id: u32, count: u32, attack: u32, defense: u32, hp: u32) -> Vec<CombatUnit> {
    (0..count)
        .map(|i| unit(first_id + i, attack, defense, hp))
        .collect()
}

/// Default config with misses disabled.
#[must_use]
pub fn sure_hit_config() -> BattleConfig {
    BattleConfig::default().with_miss_chance(I32F32::ZERO)
}

/// Engine over [`sure_hit_config`].
///
/// # Panics
///
/// Never in practice; the config is always valid.
#[must_use]
pub fn sure_hit_engine() -> BattleEngine {
    BattleEngine::new(sure_hit_config()).expect("sure-hit config is valid")
}

/// A strong attacker against a defender with a single hit point.
#[must_use]
pub fn one_shot_request() -> BattleRequest {
    BattleRequest::new("one-shot", vec![unit(1, 50, 0, 100)], vec![unit(2, 0, 0, 1)])
}

/// An even 3v3 fight that usually lasts several rounds.
#[must_use]
pub fn skirmish_request() -> BattleRequest {
    BattleRequest::new(
        "skirmish",
        vec![
            unit(1, 120, 30, 400).with_speed(3),
            unit(2, 90, 60, 500).with_speed(1),
            unit(3, 100, 45, 450).with_speed(2),
        ],
        vec![
            unit(4, 110, 40, 450).with_speed(2),
            unit(5, 100, 50, 420),
            unit(6, 95, 55, 480).with_speed(3),
        ],
    )
}
