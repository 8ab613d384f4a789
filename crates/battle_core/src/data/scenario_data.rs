//! Whole-battle definitions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::parse_ron;
use super::unit_data::UnitData;
use crate::config::BattleConfig;
use crate::error::{BattleError, Result};
use crate::math::Fixed;
use crate::report::BattleRequest;
use crate::rewards::BattleType;
use crate::unit::CombatUnit;

/// A complete battle loaded from data.
///
/// # Example RON
///
/// ```ron
/// BattleScenario(
///     battle_id: "pass-ambush",
///     attacker: "Shu vanguard",
///     defender: "Bandit camp",
///     attackers: [
///         (id: 1, name: "Spearman", attack: 120, defense: 40, hp: 900),
///     ],
///     defenders: [
///         (id: 10, name: "Bandit", attack: 60, defense: 10, hp: 300),
///     ],
///     terrain_bonus: "0.2",
///     battle_type: pve,
///     seed: Some(42),
///     config: Some((max_rounds: 15)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleScenario {
    /// Identifier copied into the report.
    #[serde(default = "default_battle_id")]
    pub battle_id: String,

    /// Attacking side label.
    #[serde(default = "default_attacker")]
    pub attacker: String,

    /// Defending side label.
    #[serde(default = "default_defender")]
    pub defender: String,

    /// Attacking roster.
    pub attackers: Vec<UnitData>,

    /// Defending roster.
    pub defenders: Vec<UnitData>,

    /// Defense bonus fraction for the defenders.
    #[serde(default)]
    pub terrain_bonus: Fixed,

    /// Kind of battle.
    #[serde(default)]
    pub battle_type: BattleType,

    /// Attacker level minus defender level.
    #[serde(default)]
    pub level_diff: i32,

    /// Explicit side powers; estimated from the rosters when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub powers: Option<(u32, u32)>,

    /// RNG seed for reproducible runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Config override; fields it omits keep their defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<BattleConfig>,
}

fn default_battle_id() -> String {
    "scenario".to_string()
}

fn default_attacker() -> String {
    "attacker".to_string()
}

fn default_defender() -> String {
    "defender".to_string()
}

impl BattleScenario {
    /// Parse a scenario from RON text.
    ///
    /// `source` labels the text in error messages (usually a file path).
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::DataParseError`] on malformed RON and
    /// [`BattleError::InvalidConfig`] if the embedded config is out of range.
    pub fn from_ron_str(source: &str, text: &str) -> Result<Self> {
        let scenario: Self = parse_ron(source, text)?;
        if let Some(config) = &scenario.config {
            config.validate()?;
        }
        Ok(scenario)
    }

    /// The scenario's own config, or `fallback` when it has none.
    #[must_use]
    pub fn effective_config(&self, fallback: &BattleConfig) -> BattleConfig {
        self.config.clone().unwrap_or_else(|| fallback.clone())
    }

    /// Build the engine request for this scenario.
    ///
    /// `config` supplies default crit rates for units that omit them.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidUnit`] for a unit with zero hp or an id
    /// used twice across both rosters.
    pub fn to_request(&self, config: &BattleConfig) -> Result<BattleRequest> {
        let mut seen = BTreeSet::new();
        for data in self.attackers.iter().chain(&self.defenders) {
            if !seen.insert(data.id) {
                return Err(BattleError::InvalidUnit {
                    id: data.id,
                    reason: "duplicate unit id".to_string(),
                });
            }
        }

        let attackers = build_roster(&self.attackers, config)?;
        let defenders = build_roster(&self.defenders, config)?;

        let mut request = BattleRequest::new(self.battle_id.clone(), attackers, defenders)
            .with_labels(self.attacker.clone(), self.defender.clone())
            .with_terrain(self.terrain_bonus)
            .with_battle_type(self.battle_type)
            .with_level_diff(self.level_diff);
        if let Some((attacker_power, defender_power)) = self.powers {
            request = request.with_powers(attacker_power, defender_power);
        }
        Ok(request)
    }
}

fn build_roster(units: &[UnitData], config: &BattleConfig) -> Result<Vec<CombatUnit>> {
    units.iter().map(|u| u.to_combat_unit(config)).collect()
}
