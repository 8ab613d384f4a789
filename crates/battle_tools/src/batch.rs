//! Batch battle runner for balance testing.
//!
//! Resolves one request under many seeds in parallel using rayon and
//! compares the observed attacker win rate with the engine's estimate.

use std::path::Path;
use std::time::Instant;

use battle_core::report::{BattleEngine, BattleRequest, BattleTally};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ToolError;

/// Configuration for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of battles to run.
    pub battle_count: u32,
    /// Seed of the first battle; battle `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Maximum parallel battles (0 = use rayon default).
    pub parallel: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            battle_count: 100,
            seed_start: 0,
            parallel: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a number of battles.
    pub fn new(battle_count: u32) -> Self {
        Self {
            battle_count,
            ..Default::default()
        }
    }

    /// Set seed start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Aggregate outcome.
    pub summary: BattleTally,
    /// Attacker power used for the estimate.
    pub attacker_power: u32,
    /// Defender power used for the estimate.
    pub defender_power: u32,
    /// Engine's pre-battle win-rate estimate, as a decimal string.
    pub expected_win_rate: String,
    /// Observed attacker win rate.
    pub observed_win_rate: f64,
    /// Total runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ToolError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Resolve `request` once per seed in parallel and summarize.
///
/// Validation is skipped: batch runs exist to explore lopsided matchups too.
pub fn run_batch(
    engine: &BattleEngine,
    request: &BattleRequest,
    config: &BatchConfig,
) -> BatchResults {
    if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let check = engine.check(request);
    if let Some(reason) = check.reason {
        warn!(%reason, "Batch matchup would be rejected in play");
    }

    let start = Instant::now();
    let summary = (0..config.battle_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let mut rng = StdRng::seed_from_u64(seed);
            BattleTally::from_report(&engine.resolve(request, &mut rng))
        })
        .reduce(BattleTally::default, BattleTally::merge);

    let (attacker_power, defender_power) = request.side_powers();
    let expected = battle_core::power::estimate_win_rate(attacker_power, defender_power);

    info!(
        battles = summary.battles,
        win_rate = summary.win_rate(),
        expected = %expected,
        "Batch complete"
    );

    BatchResults {
        config: *config,
        observed_win_rate: summary.win_rate(),
        summary,
        attacker_power,
        defender_power,
        expected_win_rate: expected.to_string(),
        duration_seconds: start.elapsed().as_secs_f64(),
    }
}
