//! End-to-end battle engine tests.

use battle_core::prelude::*;
use battle_core::simulation::run_simulation;
use battle_test_utils::determinism::{run_parallel_battles_scoped, verify_battle_determinism};
use battle_test_utils::fixtures::{
    fixed, fixed_f, one_shot_request, roster, seeded_rng, skirmish_request, sure_hit_config,
    sure_hit_engine, unit,
};

// =============================================================================
// Validator and estimator scenarios
// =============================================================================

#[test]
fn test_even_powers_valid_at_half() {
    let result = validate_battle(1000, 1000, 0);
    assert!(result.valid);
    assert_eq!(result.reason, None);
    assert_eq!(estimate_win_rate(1000, 1000), fixed_f(0.5));
}

#[test]
fn test_twenty_fold_underdog_valid_but_unfavored() {
    let result = validate_battle(100, 2000, 0);
    assert!(result.valid);

    let rate = estimate_win_rate(100, 2000);
    assert!(rate < fixed_f(0.5));
    assert!(rate >= fixed_f(0.05));
    assert!(rate > fixed_f(0.3));
}

#[test]
fn test_forty_fold_underdog_rejected_for_power() {
    let result = validate_battle(50, 2000, 0);
    assert!(!result.valid);
    assert!(matches!(result.reason, Some(Rejection::HopelessOdds { .. })));
}

#[test]
fn test_level_difference_boundary() {
    assert!(validate_battle(1000, 1000, 5).valid);
    assert!(!validate_battle(1000, 1000, 6).valid);
}

// =============================================================================
// Simulation scenarios
// =============================================================================

#[test]
fn test_one_shot_battle() {
    let attackers = vec![unit(1, 50, 0, 100)];
    let defenders = vec![unit(2, 0, 0, 1)];
    let mut rng = seeded_rng(123);

    let rounds = simulate(&attackers, &defenders, fixed(0), &sure_hit_config(), &mut rng);

    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].winner, Some(Winner::Attacker));
    let win_type = classify(&rounds, 1, 1);
    assert!(matches!(
        win_type,
        WinType::Annihilation | WinType::Breakthrough
    ));
}

#[test]
fn test_round_log_bounded_and_ordered() {
    let config = BattleConfig::default().with_max_rounds(4);
    let attackers = roster(1, 3, 20, 400, 2000);
    let defenders = roster(10, 3, 20, 400, 2000);

    for seed in 0..20 {
        let rounds = simulate(&attackers, &defenders, fixed(0), &config, &mut seeded_rng(seed));
        assert!(rounds.len() <= 4);
        for pair in rounds.windows(2) {
            assert_eq!(pair[1].round, pair[0].round + 1);
            assert!(pair[0].winner.is_none());
        }
    }
}

#[test]
fn test_defenders_only_act_against_living_attackers() {
    let attackers = roster(1, 2, 150, 0, 120);
    let defenders = roster(10, 4, 150, 0, 120);
    let outcome = run_simulation(
        &attackers,
        &defenders,
        fixed(0),
        &sure_hit_config(),
        &NoModifier,
        &mut seeded_rng(5),
    );

    for round in &outcome.rounds {
        for action in &round.defender_actions {
            assert!(action.unit_id >= 10);
            assert!(action.target < 10);
        }
        for action in &round.attacker_actions {
            assert!(action.unit_id < 10);
            assert!(action.target >= 10);
        }
    }
}

#[test]
fn test_terrain_bonus_helps_defenders() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    let base = BattleRequest::new("t", roster(1, 3, 100, 50, 500), roster(10, 3, 100, 50, 500));
    // Defense 50 becomes 1050, roughly halving incoming damage
    let fortified = base.clone().with_terrain(fixed(20));

    let wins = |request: &BattleRequest| {
        (0..200)
            .filter(|&seed| engine.resolve(request, &mut seeded_rng(seed)).attacker_won())
            .count()
    };
    assert!(wins(&fortified) < wins(&base));
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_report_pipeline() {
    let engine = sure_hit_engine();
    let request = one_shot_request()
        .with_labels("Wei", "Rats")
        .with_battle_type(BattleType::Pvp);

    // A one hit point defender has no power, so play would refuse this
    assert!(matches!(
        engine.resolve_validated(&request, &mut seeded_rng(2)),
        Err(BattleError::Rejected(Rejection::PowerGap { .. }))
    ));

    let report = engine.resolve(&request, &mut seeded_rng(2));

    assert_eq!(report.attacker, "Wei");
    assert_eq!(report.winner, Winner::Attacker);
    assert_eq!(report.rewards.prestige, 20);
    assert_eq!(report.rewards.gold, 0);
    assert_eq!(report.losses.defender.killed, 1);
    assert_eq!(report.losses.attacker, SideLosses::default());
    assert_eq!(report.attacker_power, 60);
    assert_eq!(report.defender_power, 0);
}

#[test]
fn test_validated_pipeline_accepts_even_fight() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    let report = engine
        .resolve_validated(&skirmish_request(), &mut seeded_rng(4))
        .unwrap();

    assert!(report.round_count() >= 1);
    assert!(report.round_count() <= 10);
    let killed = report.losses.attacker.killed + report.losses.defender.killed;
    match report.winner {
        Winner::Attacker => assert_eq!(report.losses.defender.killed, 3),
        Winner::Defender if report.win_type != WinType::Escape => {
            assert_eq!(report.losses.attacker.killed, 3);
        }
        _ => assert!(killed <= 6),
    }
}

#[test]
fn test_hero_roster_pipeline() {
    let config = BattleConfig::default();
    let heroes = vec![
        HeroProfile::new(1, "Guan Yu", 18, 12, 150).with_grade(4, 20),
        HeroProfile::new(2, "Zhang Fei", 20, 10, 140).with_grade(3, 15),
    ];
    let bandits = vec![HeroProfile::new(10, "Bandit", 10, 8, 100).with_grade(1, 5)];

    let attackers: Vec<CombatUnit> = heroes
        .iter()
        .map(|h| h.to_combat_unit(&config).unwrap())
        .collect();
    let defenders: Vec<CombatUnit> = bandits
        .iter()
        .map(|h| h.to_combat_unit(&config).unwrap())
        .collect();

    let request = BattleRequest::new("heroes", attackers, defenders)
        .with_powers(hero_power(&heroes), hero_power(&bandits));
    let engine = BattleEngine::new(config).unwrap();

    // Powers are far enough apart that the validator refuses
    let check = engine.check(&request);
    assert!(matches!(check.reason, Some(Rejection::PowerGap { .. })));

    let report = engine.resolve(&request, &mut seeded_rng(8));
    assert_eq!(report.attacker_power, hero_power(&heroes));
    assert!(report.expected_win_rate > fixed_f(0.5));
}

#[test]
fn test_win_pays_more_than_loss() {
    let config = BattleConfig::default();
    for power in [0u32, 500, 2000, 40_000] {
        let win = compute_rewards(true, power, BattleType::Pve, &config);
        let loss = compute_rewards(false, power, BattleType::Pve, &config);
        assert!(win.exp >= loss.exp);
        assert!(loss.prestige < 0);
        assert!(win.prestige > 0);
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_same_seed_byte_identical_rounds() {
    let request = skirmish_request();
    let config = BattleConfig::default();

    let a = simulate(&request.attackers, &request.defenders, fixed(0), &config, &mut seeded_rng(31));
    let b = simulate(&request.attackers, &request.defenders, fixed(0), &config, &mut seeded_rng(31));

    assert_eq!(bincode::serialize(&a).unwrap(), bincode::serialize(&b).unwrap());
}

#[test]
fn test_same_seed_byte_identical_reports() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    let request = skirmish_request().with_terrain(fixed_f(0.25));

    let a = engine.resolve(&request, &mut seeded_rng(64)).to_bytes().unwrap();
    let b = engine.resolve(&request, &mut seeded_rng(64)).to_bytes().unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_engine_determinism_harness() {
    let engine = BattleEngine::new(BattleConfig::default()).unwrap();
    assert!(verify_battle_determinism(&engine, &skirmish_request(), 17));
    run_parallel_battles_scoped(&engine, &skirmish_request(), 17, 4).assert_deterministic();
}
