//! # Battle Core
//!
//! Deterministic turn-based battle resolution.
//!
//! This crate contains **only** pure battle logic:
//! - No IO
//! - No hidden randomness (every call takes an injected RNG)
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Reproducible battle logs from a seed
//! - Running many battles in parallel
//! - Balance tooling outside the game server
//!
//! ## Crate Structure
//!
//! - [`unit`] - Combat unit definitions
//! - [`config`] - Battle tuning constants
//! - [`damage`] - Per-attack damage formula
//! - [`simulation`] - Round-based battle loop
//! - [`outcome`] - Win type classification
//! - [`rewards`] - Post-battle rewards
//! - [`validation`] - Pre-flight eligibility checks
//! - [`power`] - Power and win-rate estimation
//! - [`report`] - The full battle pipeline
//! - [`math`] - Fixed-point math and exact reward ratios

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod damage;
pub mod data;
pub mod error;
pub mod hero;
pub mod math;
pub mod modifier;
pub mod outcome;
pub mod power;
pub mod report;
pub mod rewards;
pub mod simulation;
pub mod unit;
pub mod validation;

pub use error::{BattleError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::BattleConfig;
    pub use crate::damage::{compute_damage, DamageRoll};
    pub use crate::data::{BattleScenario, UnitData};
    pub use crate::error::{BattleError, Result};
    pub use crate::hero::{hero_power, HeroProfile};
    pub use crate::math::{Fixed, Ratio};
    pub use crate::modifier::{DamageModifier, NoModifier, SkillBoosts};
    pub use crate::outcome::{classify, WinType};
    pub use crate::power::{estimate_power, estimate_win_rate, PowerProfile};
    pub use crate::report::{BattleEngine, BattleReport, BattleRequest, Losses, SideLosses};
    pub use crate::rewards::{compute_rewards, BattleType, RewardBundle};
    pub use crate::simulation::{simulate, ActionKind, BattleRound, Side, UnitAction, Winner};
    pub use crate::unit::CombatUnit;
    pub use crate::validation::{validate_battle, Rejection, ValidationResult};
}
