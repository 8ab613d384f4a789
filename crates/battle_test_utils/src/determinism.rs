//! Determinism testing utilities.
//!
//! Provides a harness for verifying that battles produce identical reports
//! given identical inputs and seeds.
//!
//! # Testing Strategy
//!
//! Battle logs are replayed for clients and compared across servers, so a
//! seeded battle must resolve the same way everywhere. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`battle_core::math::Fixed`] throughout.
//!
//! - **Roll order**: Every attack draws exactly three rolls in a fixed order,
//!   so adding a log line or reordering checks must never change what is drawn.
//!
//! - **System randomness**: No calls to `rand()` without explicit seeds.
//!   Every battle takes an injected, seeded RNG.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Damage rolls and single rounds are reproducible
//! 2. **Property tests**: Random rosters must still produce deterministic reports
//! 3. **Integration tests**: Full engine runs are byte-identical
//! 4. **Parallel tests**: Running N battles on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use battle_core::report::{BattleEngine, BattleReport, BattleRequest};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Seed every run used.
    pub seed: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Seed: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.seed,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelBattleResult {
    /// Report hash from each battle.
    pub hashes: Vec<u64>,
    /// Number of battles run.
    pub num_battles: usize,
}

impl ParallelBattleResult {
    /// Check if all battles produced identical reports.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all battles matched.
    ///
    /// # Panics
    ///
    /// Panics if battles produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel battles diverged!\n\
                 Battles: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_battles,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a seeded computation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `seed` - Seed handed to every run
/// * `run` - Function producing a result from a fresh seeded RNG
/// * `hash` - Function to compute the result hash
///
/// # Example
///
/// ```ignore
/// use battle_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,  // Run 5 times
///     42, // same seed each time
///     |rng| engine.resolve(&request, rng),
///     BattleReport::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<T, Run, HashFn>(
    runs: usize,
    seed: u64,
    run: Run,
    hash: HashFn,
) -> DeterminismResult
where
    Run: Fn(&mut StdRng) -> T,
    HashFn: Fn(&T) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = run(&mut rng);
        hashes.push(hash(&result));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        seed,
    }
}

/// Resolve the same request twice with the same seed and compare reports.
///
/// # Returns
///
/// `true` if both runs produced identical report hashes.
pub fn verify_battle_determinism(engine: &BattleEngine, request: &BattleRequest, seed: u64) -> bool {
    verify_determinism(
        2,
        seed,
        |rng| engine.resolve(request, rng),
        BattleReport::state_hash,
    )
    .is_deterministic
}

/// Run N battles on scoped threads and collect report hashes.
///
/// Useful for catching non-determinism that only manifests under thread
/// scheduling variations.
///
/// # Panics
///
/// Panics if a battle thread panics.
pub fn run_parallel_battles_scoped(
    engine: &BattleEngine,
    request: &BattleRequest,
    seed: u64,
    num_battles: usize,
) -> ParallelBattleResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    engine.resolve(request, &mut rng).state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelBattleResult {
        hashes,
        num_battles,
    }
}

/// Resolve a request twice and find the first round whose log differs.
///
/// # Returns
///
/// `None` if the reports match, `Some(round)` for the first diverging round
/// number (or one past the shorter log if only the lengths differ).
pub fn find_first_divergence(
    engine: &BattleEngine,
    request: &BattleRequest,
    seed: u64,
) -> Option<u32> {
    let first = engine.resolve(request, &mut StdRng::seed_from_u64(seed));
    let second = engine.resolve(request, &mut StdRng::seed_from_u64(seed));

    if let Some((a, _)) = first
        .rounds
        .iter()
        .zip(&second.rounds)
        .find(|(a, b)| a != b)
    {
        return Some(a.round);
    }
    if first.rounds.len() != second.rounds.len() {
        let shorter = first.rounds.len().min(second.rounds.len());
        return Some(shorter as u32 + 1);
    }
    None
}

/// Verify that a bincode round trip preserves a report exactly.
pub fn verify_serialization_determinism(report: &BattleReport) -> bool {
    let Ok(bytes) = report.to_bytes() else {
        return false;
    };
    let Ok(restored) = BattleReport::from_bytes(&bytes) else {
        return false;
    };
    restored.state_hash() == report.state_hash() && restored == *report
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the battle engine.
pub mod strategies {
    use battle_core::config::BattleConfig;
    use battle_core::math::{percent, Fixed};
    use battle_core::unit::CombatUnit;
    use proptest::prelude::*;

    /// Generate a fraction in `[0, 1]` with percent granularity.
    pub fn arb_fraction() -> impl Strategy<Value = Fixed> {
        (0i32..=100i32).prop_map(percent)
    }

    /// Generate attack or defense values (0-500).
    pub fn arb_stat() -> impl Strategy<Value = u32> {
        0u32..500u32
    }

    /// Generate health values (1-1000).
    pub fn arb_health() -> impl Strategy<Value = u32> {
        1u32..1000u32
    }

    /// Generate a terrain bonus between -50% and +100%.
    pub fn arb_terrain() -> impl Strategy<Value = Fixed> {
        (-50i32..=100i32).prop_map(percent)
    }

    /// Generate a side power (0-100k).
    pub fn arb_power() -> impl Strategy<Value = u32> {
        0u32..100_000u32
    }

    /// Generate a valid combat unit with the given id.
    pub fn arb_unit(id: u32) -> impl Strategy<Value = CombatUnit> {
        (
            arb_stat(),
            arb_stat(),
            arb_health(),
            0u32..10u32,
            arb_fraction(),
            100i32..300i32,
        )
            .prop_map(move |(attack, defense, hp, speed, crit_rate, crit_pct)| {
                CombatUnit::new(id, format!("unit-{id}"), attack, defense, hp)
                    .expect("arb_health never yields 0")
                    .with_speed(speed)
                    .with_crit(crit_rate, percent(crit_pct))
            })
    }

    /// Generate a roster of up to `max_units` units with ids from `first_id`.
    pub fn arb_roster(first_id: u32, max_units: usize) -> impl Strategy<Value = Vec<CombatUnit>> {
        (0..=max_units).prop_flat_map(move |len| {
            (0..len)
                .map(|i| arb_unit(first_id + i as u32))
                .collect::<Vec<_>>()
        })
    }

    /// Generate a valid battle config.
    pub fn arb_config() -> impl Strategy<Value = BattleConfig> {
        (
            1u32..15u32,
            (0i32..100i32).prop_map(percent),
            arb_fraction(),
            (100i32..300i32).prop_map(percent),
            arb_fraction(),
        )
            .prop_map(
                |(max_rounds, damage_variance, critical_rate, critical_damage, miss_chance)| {
                    BattleConfig {
                        max_rounds,
                        damage_variance,
                        critical_rate,
                        critical_damage,
                        miss_chance,
                        ..BattleConfig::default()
                    }
                },
            )
    }
}
