//! Balance testing utilities.
//!
//! This module provides tools for running many seeded battles of one
//! matchup and comparing the observed win rate with the pre-battle
//! estimate.

use battle_core::report::{BattleEngine, BattleReport, BattleRequest, BattleTally};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

/// Statistics for a set of battles of one matchup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchupStats {
    /// Outcome counts.
    #[serde(flatten)]
    pub tally: BattleTally,
    /// Pre-battle estimate for the attacker, as reported by the engine.
    pub expected_win_rate: f64,
}

impl MatchupStats {
    /// Add one battle report.
    pub fn record(&mut self, report: &BattleReport) {
        self.tally.record(report);
        self.expected_win_rate = report.expected_win_rate.to_num::<f64>();
    }

    /// Combine two partial tallies of the same matchup.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        if self.tally.battles == 0 {
            self.expected_win_rate = other.expected_win_rate;
        }
        self.tally = self.tally.merge(other.tally);
        self
    }

    /// Observed attacker win rate (0.0 to 1.0).
    pub fn win_rate(&self) -> f64 {
        self.tally.win_rate()
    }

    /// Average rounds per battle.
    pub fn avg_rounds(&self) -> f64 {
        self.tally.avg_rounds()
    }

    /// Observed win rate minus the engine's estimate.
    pub fn estimate_error(&self) -> f64 {
        self.win_rate() - self.expected_win_rate
    }

    /// Check if the matchup is balanced (within acceptable range).
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.win_rate();
        rate >= min_rate && rate <= max_rate
    }
}

/// Resolve `request` once per seed in `seeds` and tally the results.
pub fn run_matchup(
    engine: &BattleEngine,
    request: &BattleRequest,
    seeds: impl IntoIterator<Item = u64>,
) -> MatchupStats {
    let stats = seeds
        .into_iter()
        .fold(MatchupStats::default(), |mut stats, seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            stats.record(&engine.resolve(request, &mut rng));
            stats
        });
    debug!(
        battles = stats.tally.battles,
        win_rate = stats.win_rate(),
        "Matchup finished"
    );
    stats
}
