//! Classroom Simulation Test
//!
//! Runs whole games on paused tokio time: one instructor advancing rounds on
//! a timer and several student agents polling, trading and getting ranked.

use approx::assert_relative_eq;
use odyssey_market::CashInjectionConfig;
use odyssey_runner::{
    ClassroomConfig, ClassroomSimulation, RunnerError, StrategyKind, StudentProfile,
    run_classroom,
};
use std::collections::HashSet;

/// Five short rounds; polls never land on the same instant as a round change
fn short_game(seed: u64) -> ClassroomConfig {
    ClassroomConfig {
        max_rounds: 5,
        round_interval_ms: 1_000,
        poll_interval_ms: 130,
        seed: Some(seed),
        cash_injection: CashInjectionConfig {
            base: 5_000.0,
            per_round: 500.0,
            variability: 0.0,
        },
        ..Default::default()
    }
}

/// Every student finishes and lands on the leaderboard exactly once
#[tokio::test(start_paused = true)]
async fn test_full_game_ranks_every_student() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = short_game(42);
    let results = run_classroom(config.clone()).await.unwrap();

    assert!(results.success, "simulation failed: {:?}", results.error);
    assert_eq!(results.rounds_played, 5);
    assert!(results.offline_students.is_empty());

    assert_eq!(results.leaderboard.len(), config.students.len());
    let ranked: HashSet<&str> = results
        .leaderboard
        .iter()
        .map(|e| e.student_id.as_str())
        .collect();
    assert_eq!(ranked, HashSet::from(["alice", "bob", "carol", "dave"]));

    // Best first
    for pair in results.leaderboard.windows(2) {
        assert!(pair[0].final_value >= pair[1].final_value);
    }

    // Everyone saw the game-over screen
    assert_eq!(results.final_value_by_student.len(), 4);
}

/// The cash holder ends with starting cash plus every injection
#[tokio::test(start_paused = true)]
async fn test_cash_holder_keeps_every_injection() {
    let results = run_classroom(short_game(7)).await.unwrap();

    let dave = results
        .leaderboard
        .iter()
        .find(|e| e.student_id == "dave")
        .unwrap();

    // 5000 + 500 * r for r = 1..=5
    assert_relative_eq!(dave.total_cash_injected, 32_500.0, epsilon = 1e-6);
    assert_relative_eq!(dave.final_value, 42_500.0, epsilon = 1e-6);
    assert_relative_eq!(dave.adjusted_return_pct, 0.0, epsilon = 1e-9);
    assert_relative_eq!(
        results.final_value_by_student["dave"],
        dave.final_value,
        epsilon = 1e-6
    );
    assert_eq!(results.trades_by_student["dave"], 0);
}

/// Active strategies actually trade
#[tokio::test(start_paused = true)]
async fn test_strategies_trade() {
    let results = run_classroom(short_game(3)).await.unwrap();

    // Buy-and-hold spreads the opening cash and every injection over six assets
    assert!(results.trades_by_student["alice"] >= 6);
    // Rebalancer buys at round 0 and rotates at round 4
    assert!(results.trades_by_student["bob"] >= 12);
    assert!(results.trades_by_student["carol"] > 0);
    assert_eq!(
        results.total_trades,
        results.trades_by_student.values().sum::<u64>()
    );
}

/// Same seed, same classroom, same outcome
#[tokio::test(start_paused = true)]
async fn test_seeded_games_are_reproducible() {
    let first = run_classroom(short_game(11)).await.unwrap();
    let second = run_classroom(short_game(11)).await.unwrap();

    assert_eq!(first.leaderboard.len(), second.leaderboard.len());
    for (a, b) in first.leaderboard.iter().zip(&second.leaderboard) {
        assert_eq!(a.student_id, b.student_id);
        assert_relative_eq!(a.final_value, b.final_value, epsilon = 1e-6);
    }
}

/// A one-round game with a single student still completes and ranks them
#[tokio::test(start_paused = true)]
async fn test_single_round_single_student() {
    let config = ClassroomConfig {
        max_rounds: 1,
        students: vec![StudentProfile::new("solo", StrategyKind::Momentum { top: 1 })],
        ..short_game(5)
    };

    let simulation = ClassroomSimulation::with_config(config).await.unwrap();
    let session_id = simulation.session_id();
    let results = simulation.run().await;

    assert!(results.success);
    assert_eq!(results.session_id, Some(session_id));
    assert_eq!(results.rounds_played, 1);
    assert_eq!(results.leaderboard.len(), 1);
    assert_eq!(results.leaderboard[0].student_id, "solo");
}

/// An invalid classroom is refused before any session is created
#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = ClassroomConfig {
        students: Vec::new(),
        ..Default::default()
    };

    let err = ClassroomSimulation::with_config(config).await.err().unwrap();
    assert!(matches!(err, RunnerError::Config(_)));
}

/// Config files override only what they mention
#[test]
fn test_config_file_loading() {
    let dir = std::env::temp_dir();

    let path = dir.join(format!("classroom-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"{
            "section_id": "FIN-200",
            "max_rounds": 8,
            "sync_retry_limit": 3,
            "students": [
                {"id": "ann", "strategy": {"type": "rebalancer", "every": 2}},
                {"id": "ben", "strategy": {"type": "buy_and_hold"}}
            ]
        }"#,
    )
    .unwrap();
    let config = ClassroomConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.section_id, "FIN-200");
    assert_eq!(config.max_rounds, 8);
    assert_eq!(config.sync_retry_limit, Some(3));
    assert_eq!(config.students[0].strategy, StrategyKind::Rebalancer { every: 2 });
    assert_eq!(config.poll_interval_ms, ClassroomConfig::default().poll_interval_ms);

    let missing = dir.join(format!("missing-{}.json", uuid::Uuid::new_v4()));
    assert!(matches!(
        ClassroomConfig::from_json_file(&missing),
        Err(RunnerError::Io(_))
    ));

    let broken = dir.join(format!("broken-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&broken, "{ not json").unwrap();
    let result = ClassroomConfig::from_json_file(&broken);
    std::fs::remove_file(&broken).unwrap();
    assert!(matches!(result, Err(RunnerError::Json(_))));
}
