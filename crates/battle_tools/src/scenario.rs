//! Scenario loading and single-battle runs.

use std::path::Path;

use battle_core::config::BattleConfig;
use battle_core::data::BattleScenario;
use battle_core::report::{BattleEngine, BattleReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::error::ToolError;

/// Read a file to a string, mapping a missing file to [`ToolError::FileNotFound`].
pub fn read_text(path: &Path) -> Result<String, ToolError> {
    if !path.exists() {
        return Err(ToolError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Load a scenario from a RON file.
pub fn load_scenario(path: &Path) -> Result<BattleScenario, ToolError> {
    let text = read_text(path)?;
    let scenario = BattleScenario::from_ron_str(&path.display().to_string(), &text)?;
    debug!(
        path = %path.display(),
        attackers = scenario.attackers.len(),
        defenders = scenario.defenders.len(),
        "Loaded scenario"
    );
    Ok(scenario)
}

/// Load a config from a RON file, or the default config when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<BattleConfig, ToolError> {
    match path {
        Some(path) => {
            let text = read_text(path)?;
            Ok(BattleConfig::from_ron_str(&path.display().to_string(), &text)?)
        }
        None => Ok(BattleConfig::default()),
    }
}

/// How to run a single scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Seed override; falls back to the scenario's seed, then to entropy.
    pub seed: Option<u64>,
    /// Resolve even when the validator rejects the battle.
    pub force: bool,
}

/// Resolve one scenario.
///
/// The scenario's embedded config, if any, replaces `base_config`.
pub fn run_scenario(
    scenario: &BattleScenario,
    base_config: &BattleConfig,
    options: RunOptions,
) -> Result<BattleReport, ToolError> {
    let config = scenario.effective_config(base_config);
    let request = scenario.to_request(&config)?;
    let engine = BattleEngine::new(config)?;

    let mut rng = match options.seed.or(scenario.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = if options.force {
        engine.resolve(&request, &mut rng)
    } else {
        engine.resolve_validated(&request, &mut rng)?
    };

    info!(
        battle_id = %report.battle_id,
        winner = ?report.winner,
        rounds = report.round_count(),
        "Scenario finished"
    );
    Ok(report)
}
