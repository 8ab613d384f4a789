//! Round-based battle simulation.
//!
//! Each round runs in two phases: every living attacker acts once against a
//! random living defender, then every living defender acts once against a
//! random living attacker. Within a phase, faster units act first and ties
//! keep roster order.
//!
//! The simulator works on copies of both rosters with hp reset to max, so
//! callers' units are never touched. Liveness is tracked on those copies and
//! recorded per round; outcome classification reads those counts instead of
//! guessing kills from the action log.

use std::cmp::Reverse;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::BattleConfig;
use crate::damage::compute_damage_with;
use crate::math::{floor_u32, from_stat, Fixed};
use crate::modifier::{DamageModifier, NoModifier};
use crate::unit::{alive_count, CombatUnit};

/// One side of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The side that initiated the battle.
    Attacker,
    /// The side being attacked.
    Defender,
}

/// Who won a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// Every defender fell while an attacker survived.
    Attacker,
    /// Every attacker fell, or the attackers failed to break through in time.
    Defender,
    /// Both sides were wiped out in the same round.
    Draw,
}

/// What a unit did on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// A plain attack.
    Attack,
    /// An attack whose damage was changed by a skill modifier.
    Skill,
}

/// Record of a single unit's action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitAction {
    /// Acting unit.
    pub unit_id: u32,
    /// Acting unit's display name.
    pub name: String,
    /// Kind of action taken.
    pub kind: ActionKind,
    /// Unit that was hit.
    pub target: u32,
    /// Damage dealt.
    pub damage: u32,
    /// Target's hp after the hit.
    pub target_hp: u32,
    /// Critical hit.
    pub crit: bool,
    /// Missed attack.
    pub miss: bool,
}

/// One simulated round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleRound {
    /// Round number, starting at 1.
    pub round: u32,
    /// Actions taken by the attacking side, in turn order.
    pub attacker_actions: Vec<UnitAction>,
    /// Actions taken by the defending side, in turn order.
    pub defender_actions: Vec<UnitAction>,
    /// Attackers still standing when the round ended.
    pub attackers_alive: u32,
    /// Defenders still standing when the round ended.
    pub defenders_alive: u32,
    /// Set only on the round that ended the battle.
    pub winner: Option<Winner>,
}

/// Full result of a simulation, including the final state of both rosters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// Round log in order.
    pub rounds: Vec<BattleRound>,
    /// Attacking units as they ended the battle.
    pub attackers: Vec<CombatUnit>,
    /// Defending units as they ended the battle (terrain bonus applied).
    pub defenders: Vec<CombatUnit>,
}

impl SimulationOutcome {
    /// Winner recorded on the final round, or `None` if the round cap ran out.
    #[must_use]
    pub fn winner(&self) -> Option<Winner> {
        self.rounds.last().and_then(|r| r.winner)
    }
}

/// Simulate a battle and return the round log.
pub fn simulate<R: Rng + ?Sized>(
    attackers: &[CombatUnit],
    defenders: &[CombatUnit],
    terrain_bonus: Fixed,
    config: &BattleConfig,
    rng: &mut R,
) -> Vec<BattleRound> {
    run_simulation(attackers, defenders, terrain_bonus, config, &NoModifier, rng).rounds
}

/// Simulate a battle with a damage modifier and return the round log.
pub fn simulate_with<R, M>(
    attackers: &[CombatUnit],
    defenders: &[CombatUnit],
    terrain_bonus: Fixed,
    config: &BattleConfig,
    modifier: &M,
    rng: &mut R,
) -> Vec<BattleRound>
where
    R: Rng + ?Sized,
    M: DamageModifier + ?Sized,
{
    run_simulation(attackers, defenders, terrain_bonus, config, modifier, rng).rounds
}

/// Simulate a battle and keep the final unit states.
///
/// `terrain_bonus` is a fraction added to every defender's defense for this
/// battle (`0.2` = +20%); negative values weaken defenders.
pub fn run_simulation<R, M>(
    attackers: &[CombatUnit],
    defenders: &[CombatUnit],
    terrain_bonus: Fixed,
    config: &BattleConfig,
    modifier: &M,
    rng: &mut R,
) -> SimulationOutcome
where
    R: Rng + ?Sized,
    M: DamageModifier + ?Sized,
{
    let mut attackers: Vec<CombatUnit> = attackers.iter().map(CombatUnit::fresh_copy).collect();
    let mut defenders: Vec<CombatUnit> = defenders
        .iter()
        .map(|u| apply_terrain(u.fresh_copy(), terrain_bonus))
        .collect();

    let attacker_order = turn_order(&attackers);
    let defender_order = turn_order(&defenders);
    let mut rounds: Vec<BattleRound> = Vec::new();

    for round in 1..=config.max_rounds {
        // A roster can only be empty here before anyone has acted; later
        // wipes are recorded on the round that caused them.
        if let Some(winner) = decide(&attackers, &defenders) {
            debug!(round, ?winner, "Battle decided before any action");
            rounds.push(BattleRound {
                round,
                attacker_actions: Vec::new(),
                defender_actions: Vec::new(),
                attackers_alive: alive_count(&attackers),
                defenders_alive: alive_count(&defenders),
                winner: Some(winner),
            });
            break;
        }

        let attacker_actions = run_phase(
            &attackers,
            &attacker_order,
            &mut defenders,
            config,
            modifier,
            rng,
        );
        let defender_actions = run_phase(
            &defenders,
            &defender_order,
            &mut attackers,
            config,
            modifier,
            rng,
        );

        let winner = decide(&attackers, &defenders);
        let record = BattleRound {
            round,
            attacker_actions,
            defender_actions,
            attackers_alive: alive_count(&attackers),
            defenders_alive: alive_count(&defenders),
            winner,
        };
        debug!(
            round,
            attackers_alive = record.attackers_alive,
            defenders_alive = record.defenders_alive,
            "Round resolved"
        );
        rounds.push(record);

        if let Some(winner) = winner {
            debug!(round, ?winner, "Battle decided");
            break;
        }
    }

    SimulationOutcome {
        rounds,
        attackers,
        defenders,
    }
}

/// Terminal state check on the current rosters.
fn decide(attackers: &[CombatUnit], defenders: &[CombatUnit]) -> Option<Winner> {
    let attackers_alive = attackers.iter().any(CombatUnit::is_alive);
    let defenders_alive = defenders.iter().any(CombatUnit::is_alive);
    match (attackers_alive, defenders_alive) {
        (false, false) => Some(Winner::Draw),
        (true, false) => Some(Winner::Attacker),
        (false, true) => Some(Winner::Defender),
        (true, true) => None,
    }
}

/// Indices of `units` fastest first; equal speeds keep roster order.
fn turn_order(units: &[CombatUnit]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..units.len()).collect();
    order.sort_by_key(|&i| Reverse(units[i].speed));
    order
}

fn apply_terrain(mut unit: CombatUnit, terrain_bonus: Fixed) -> CombatUnit {
    if terrain_bonus != Fixed::ZERO {
        let factor = Fixed::ONE.saturating_add(terrain_bonus);
        unit.defense = floor_u32(from_stat(unit.defense).saturating_mul(factor));
    }
    unit
}

/// Let each living actor hit a random living target once.
fn run_phase<R, M>(
    actors: &[CombatUnit],
    order: &[usize],
    targets: &mut [CombatUnit],
    config: &BattleConfig,
    modifier: &M,
    rng: &mut R,
) -> Vec<UnitAction>
where
    R: Rng + ?Sized,
    M: DamageModifier + ?Sized,
{
    let mut actions = Vec::new();

    for &idx in order {
        let actor = &actors[idx];
        if !actor.is_alive() {
            continue;
        }

        let living: Vec<usize> = targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_alive())
            .map(|(i, _)| i)
            .collect();
        if living.is_empty() {
            break;
        }

        let pick = rng.gen_range(0..living.len() as u32) as usize;
        let target = &mut targets[living[pick]];
        let roll = compute_damage_with(actor, target, config, modifier, rng);
        let target_hp = target.take_damage(roll.damage);

        trace!(
            unit = actor.id,
            target = target.id,
            damage = roll.damage,
            target_hp,
            crit = roll.is_crit,
            miss = roll.is_miss,
            "Unit attacked"
        );

        actions.push(UnitAction {
            unit_id: actor.id,
            name: actor.name.clone(),
            kind: if roll.modified {
                ActionKind::Skill
            } else {
                ActionKind::Attack
            },
            target: target.id,
            damage: roll.damage,
            target_hp,
            crit: roll.is_crit,
            miss: roll.is_miss,
        });
    }

    actions
}
