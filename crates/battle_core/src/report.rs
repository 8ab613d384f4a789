//! The battle pipeline and its report.
//!
//! [`BattleEngine`] composes the pure steps into one call:
//! validate, simulate, classify, reward. The resulting [`BattleReport`] is
//! the only thing callers need to persist or send to clients.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::BattleConfig;
use crate::error::{BattleError, Result};
use crate::math::Fixed;
use crate::modifier::{DamageModifier, NoModifier};
use crate::outcome::{classify, WinType};
use crate::power::{estimate_win_rate, roster_power};
use crate::rewards::{compute_rewards, BattleType, RewardBundle};
use crate::simulation::{run_simulation, BattleRound, Side, Winner};
use crate::unit::CombatUnit;
use crate::validation::{validate_battle, ValidationResult};

/// Everything needed to run one battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRequest {
    /// Caller-chosen identifier copied into the report.
    pub battle_id: String,
    /// Label of the attacking side (player, army or city name).
    pub attacker: String,
    /// Label of the defending side.
    pub defender: String,
    /// Attacking roster.
    pub attackers: Vec<CombatUnit>,
    /// Defending roster.
    pub defenders: Vec<CombatUnit>,
    /// Defense bonus fraction for the defenders.
    pub terrain_bonus: Fixed,
    /// Kind of battle, for prestige.
    pub battle_type: BattleType,
    /// Attacker level minus defender level.
    pub level_diff: i32,
    /// Power overrides, e.g. from [`crate::hero::hero_power`]. When `None`
    /// the power is estimated from the roster.
    #[serde(default)]
    pub powers: Option<(u32, u32)>,
}

impl BattleRequest {
    /// Create a PvE request on neutral terrain with no level gap.
    #[must_use]
    pub fn new(
        battle_id: impl Into<String>,
        attackers: Vec<CombatUnit>,
        defenders: Vec<CombatUnit>,
    ) -> Self {
        Self {
            battle_id: battle_id.into(),
            attacker: "attacker".to_string(),
            defender: "defender".to_string(),
            attackers,
            defenders,
            terrain_bonus: Fixed::ZERO,
            battle_type: BattleType::Pve,
            level_diff: 0,
            powers: None,
        }
    }

    /// Builder method to set both side labels.
    #[must_use]
    pub fn with_labels(mut self, attacker: impl Into<String>, defender: impl Into<String>) -> Self {
        self.attacker = attacker.into();
        self.defender = defender.into();
        self
    }

    /// Builder method to set the terrain bonus.
    #[must_use]
    pub fn with_terrain(mut self, terrain_bonus: Fixed) -> Self {
        self.terrain_bonus = terrain_bonus;
        self
    }

    /// Builder method to set the battle type.
    #[must_use]
    pub fn with_battle_type(mut self, battle_type: BattleType) -> Self {
        self.battle_type = battle_type;
        self
    }

    /// Builder method to set the level difference.
    #[must_use]
    pub fn with_level_diff(mut self, level_diff: i32) -> Self {
        self.level_diff = level_diff;
        self
    }

    /// Builder method to override both side powers.
    #[must_use]
    pub fn with_powers(mut self, attacker_power: u32, defender_power: u32) -> Self {
        self.powers = Some((attacker_power, defender_power));
        self
    }

    /// Attacker and defender power used for validation and rewards.
    #[must_use]
    pub fn side_powers(&self) -> (u32, u32) {
        self.powers
            .unwrap_or_else(|| (roster_power(&self.attackers), roster_power(&self.defenders)))
    }
}

/// Casualties on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SideLosses {
    /// Units at 0 hp when the battle ended.
    pub killed: u32,
    /// Units alive but below max hp.
    pub wounded: u32,
}

impl SideLosses {
    /// Count casualties in a roster as it ended the battle.
    #[must_use]
    pub fn tally(units: &[CombatUnit]) -> Self {
        units.iter().fold(Self::default(), |mut losses, unit| {
            if !unit.is_alive() {
                losses.killed += 1;
            } else if unit.is_wounded() {
                losses.wounded += 1;
            }
            losses
        })
    }
}

/// Casualties on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Losses {
    /// Attacker casualties.
    pub attacker: SideLosses,
    /// Defender casualties.
    pub defender: SideLosses,
}

impl Losses {
    /// Casualties of one side.
    #[must_use]
    pub const fn side(&self, side: Side) -> &SideLosses {
        match side {
            Side::Attacker => &self.attacker,
            Side::Defender => &self.defender,
        }
    }
}

/// Complete, immutable result of one battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleReport {
    /// Identifier from the request.
    pub battle_id: String,
    /// Attacking side label.
    pub attacker: String,
    /// Defending side label.
    pub defender: String,
    /// Defense bonus the defenders fought with.
    pub terrain_bonus: Fixed,
    /// Round log.
    pub rounds: Vec<BattleRound>,
    /// Final winner. A battle that hit the round cap goes to the defender.
    pub winner: Winner,
    /// How the battle ended.
    pub win_type: WinType,
    /// Rewards for the attacker.
    pub rewards: RewardBundle,
    /// Casualties on both sides.
    pub losses: Losses,
    /// Attacker power used for validation and rewards.
    pub attacker_power: u32,
    /// Defender power used for validation and rewards.
    pub defender_power: u32,
    /// Pre-battle win-rate estimate for the attacker.
    pub expected_win_rate: Fixed,
}

impl BattleReport {
    /// Whether the attacker won.
    #[must_use]
    pub fn attacker_won(&self) -> bool {
        self.winner == Winner::Attacker
    }

    /// Number of rounds fought.
    #[must_use]
    pub fn round_count(&self) -> u32 {
        self.rounds.last().map_or(0, |r| r.round)
    }

    /// Hash of the full report, for replay and determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Encode the report with bincode.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::Serialization`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| {
            BattleError::Serialization(format!("Failed to serialize report: {e}"))
        })
    }

    /// Decode a report produced by [`BattleReport::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::Serialization`] if the bytes are not a report.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| {
            BattleError::Serialization(format!("Failed to deserialize report: {e}"))
        })
    }
}

/// Outcome counts over many reports of one matchup.
///
/// Tallies from disjoint seed ranges can be merged in any order, which lets
/// sequential and parallel runners share it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleTally {
    /// Battles recorded.
    pub battles: u32,
    /// Attacker victories.
    pub attacker_wins: u32,
    /// Defender victories, including escapes.
    pub defender_wins: u32,
    /// Mutual wipes.
    pub draws: u32,
    /// Battles that hit the round cap.
    pub escapes: u32,
    /// Battles ending with every defender dead.
    pub annihilations: u32,
    /// Sum of rounds over all battles.
    pub total_rounds: u64,
}

impl BattleTally {
    /// Tally of a single report.
    #[must_use]
    pub fn from_report(report: &BattleReport) -> Self {
        let mut tally = Self::default();
        tally.record(report);
        tally
    }

    /// Add one battle report.
    pub fn record(&mut self, report: &BattleReport) {
        self.battles += 1;
        self.total_rounds += u64::from(report.round_count());

        match report.winner {
            Winner::Attacker => self.attacker_wins += 1,
            Winner::Defender => self.defender_wins += 1,
            Winner::Draw => self.draws += 1,
        }
        match report.win_type {
            WinType::Escape => self.escapes += 1,
            WinType::Annihilation => self.annihilations += 1,
            WinType::Breakthrough => {}
        }
    }

    /// Combine two tallies.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            battles: self.battles + other.battles,
            attacker_wins: self.attacker_wins + other.attacker_wins,
            defender_wins: self.defender_wins + other.defender_wins,
            draws: self.draws + other.draws,
            escapes: self.escapes + other.escapes,
            annihilations: self.annihilations + other.annihilations,
            total_rounds: self.total_rounds + other.total_rounds,
        }
    }

    /// Observed attacker win rate (0.0 to 1.0); 0.5 before any battle.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.battles == 0 {
            return 0.5;
        }
        f64::from(self.attacker_wins) / f64::from(self.battles)
    }

    /// Average rounds per battle.
    #[must_use]
    pub fn avg_rounds(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.total_rounds as f64 / f64::from(self.battles)
    }
}

/// Runs battles under one configuration and damage modifier.
#[derive(Debug, Clone)]
pub struct BattleEngine<M = NoModifier> {
    config: BattleConfig,
    modifier: M,
}

impl BattleEngine<NoModifier> {
    /// Create an engine with no damage modifier.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidConfig`] if the config fails validation.
    pub fn new(config: BattleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            modifier: NoModifier,
        })
    }
}

impl<M: DamageModifier> BattleEngine<M> {
    /// Replace the damage modifier.
    #[must_use]
    pub fn with_modifier<N: DamageModifier>(self, modifier: N) -> BattleEngine<N> {
        BattleEngine {
            config: self.config,
            modifier,
        }
    }

    /// Configuration battles run under.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Run the validator on a request without simulating.
    #[must_use]
    pub fn check(&self, request: &BattleRequest) -> ValidationResult {
        let (attacker_power, defender_power) = request.side_powers();
        validate_battle(attacker_power, defender_power, request.level_diff)
    }

    /// Simulate a battle regardless of validation and build its report.
    pub fn resolve<R: Rng + ?Sized>(&self, request: &BattleRequest, rng: &mut R) -> BattleReport {
        let (attacker_power, defender_power) = request.side_powers();

        let outcome = run_simulation(
            &request.attackers,
            &request.defenders,
            request.terrain_bonus,
            &self.config,
            &self.modifier,
            rng,
        );

        let win_type = classify(
            &outcome.rounds,
            outcome.attackers.len() as u32,
            outcome.defenders.len() as u32,
        );
        let winner = outcome.winner().unwrap_or(Winner::Defender);
        let rewards = compute_rewards(
            winner == Winner::Attacker,
            defender_power,
            request.battle_type,
            &self.config,
        );
        let losses = Losses {
            attacker: SideLosses::tally(&outcome.attackers),
            defender: SideLosses::tally(&outcome.defenders),
        };

        info!(
            battle_id = %request.battle_id,
            ?winner,
            ?win_type,
            rounds = outcome.rounds.len(),
            attacker_power,
            defender_power,
            "Battle resolved"
        );

        BattleReport {
            battle_id: request.battle_id.clone(),
            attacker: request.attacker.clone(),
            defender: request.defender.clone(),
            terrain_bonus: request.terrain_bonus,
            rounds: outcome.rounds,
            winner,
            win_type,
            rewards,
            losses,
            attacker_power,
            defender_power,
            expected_win_rate: estimate_win_rate(attacker_power, defender_power),
        }
    }

    /// Validate every unit and the matchup, then resolve.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidUnit`] for a unit that breaks its
    /// invariants and [`BattleError::Rejected`] when the validator refuses
    /// the battle.
    pub fn resolve_validated<R: Rng + ?Sized>(
        &self,
        request: &BattleRequest,
        rng: &mut R,
    ) -> Result<BattleReport> {
        for unit in request.attackers.iter().chain(&request.defenders) {
            unit.validate()?;
        }

        if let Err(reason) = self.check(request).into_result() {
            warn!(battle_id = %request.battle_id, %reason, "Battle rejected");
            return Err(reason.into());
        }

        Ok(self.resolve(request, rng))
    }
}
