//! End-to-end solver scenarios over a sixteen-word board.

mod common;

use std::sync::Arc;

use connections_oracle::ScriptedHypothesisOracle;
use connections_types::{RoundOutcome, SolverConfig, SolverPhase, Word};

use common::*;

use SolverPhase::*;

// ---------------------------------------------------------------------------
// Accepting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn true_groups_are_accepted_over_decoys() {
    init_tracing();
    let oracle = Arc::new(ScriptedHypothesisOracle::new().otherwise(truth_and_decoys()));
    let solver = solver(Arc::clone(&oracle), SolverConfig::default());

    let solution = solver.solve(&board()).await.unwrap();

    let mut found = solution.word_sets();
    found.sort();
    assert_eq!(found, sorted_groups(&GROUPS));
    assert_eq!(solution.rounds_used, 1);
    assert_eq!(solution.phases, vec![Generating, Scoring, Searching, Accepted, Done]);
    assert!(solution.confidence > 0.9);

    let confidences = solution.group_confidences();
    assert!(confidences.iter().all(|c| (0.0..=1.0).contains(c)));
    assert!(confidences.windows(2).all(|w| w[0] >= w[1]));

    let report = &solution.rounds[0];
    assert_eq!(report.requests, 1);
    assert_eq!(report.pool_size, 6);
    assert_eq!(report.new_utterances, 6);
    assert_eq!(report.invalid, 0);
    assert!(!report.timed_out);
    assert!(matches!(report.outcome, RoundOutcome::Accepted { .. }));
    assert_eq!(oracle.request_count(), 1);
}

#[tokio::test]
async fn empty_first_round_refines_then_accepts() {
    let oracle = Arc::new(
        ScriptedHypothesisOracle::new()
            .respond(1, vec![])
            .otherwise(truth()),
    );
    let solver = solver(Arc::clone(&oracle), SolverConfig::default());

    let solution = solver.solve(&board()).await.unwrap();

    assert_eq!(solution.rounds_used, 2);
    assert_eq!(
        solution.phases,
        vec![Generating, Scoring, Searching, Refining, Generating, Scoring, Searching, Accepted, Done]
    );
    assert_eq!(solution.rounds[0].outcome, RoundOutcome::EmptyCandidateSet);
    assert_eq!(solution.groups.len(), 4);

    // Nothing to target after an empty round, so only the whole board is asked.
    let requests = oracle.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.words.len() == 16 && r.exclude.is_empty()));
}

#[tokio::test]
async fn failing_oracle_round_is_recovered() {
    let oracle = Arc::new(
        ScriptedHypothesisOracle::new()
            .fail(1, "connection reset")
            .otherwise(truth()),
    );
    let solver = solver(oracle, SolverConfig::default());

    let solution = solver.solve(&board()).await.unwrap();
    assert_eq!(solution.rounds_used, 2);
    assert_eq!(solution.rounds[0].proposals, 0);
    assert!(!solution.rounds[0].timed_out);
    assert_eq!(solution.rounds[0].outcome, RoundOutcome::EmptyCandidateSet);
}

// ---------------------------------------------------------------------------
// Failing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exhausted_budget_reports_best_partial() {
    let oracle = Arc::new(ScriptedHypothesisOracle::new().otherwise(truth()[..2].to_vec()));
    let config = SolverConfig {
        max_rounds: 1,
        ..SolverConfig::default()
    };
    let solver = solver(oracle, config);

    let failure = solver.solve(&board()).await.unwrap_err();

    assert_eq!(failure.rounds, 1);
    assert_eq!(failure.board_size, 16);
    assert_eq!(failure.best_partial.groups.len(), 2);
    assert!(!failure.best_partial.complete);
    assert!(failure.best_partial.is_disjoint());
    assert_eq!(failure.uncovered.len(), 8);
    for word in ["OPTION", "RETURN", "KAYAK", "MOM"] {
        assert!(failure.uncovered.contains(&Word::new(word)));
    }
    assert_eq!(failure.phases, vec![Generating, Scoring, Searching, Failed]);
    assert_eq!(
        failure.reports[0].outcome,
        RoundOutcome::NoCompletePartition { uncovered: 8 }
    );
    assert!(failure
        .group_confidences()
        .iter()
        .all(|c| (0.0..=1.0).contains(c)));
}

#[tokio::test]
async fn incomplete_round_targets_uncovered_words() {
    let oracle = Arc::new(ScriptedHypothesisOracle::new().otherwise(truth()[..2].to_vec()));
    let config = SolverConfig {
        max_rounds: 2,
        ..SolverConfig::default()
    };
    let solver = solver(Arc::clone(&oracle), config);

    let failure = solver.solve(&board()).await.unwrap_err();
    assert_eq!(failure.rounds, 2);
    assert_eq!(failure.phases.iter().filter(|p| **p == Refining).count(), 1);
    assert_eq!(failure.phases.last(), Some(&Failed));

    let mut second: Vec<usize> = oracle
        .requests()
        .iter()
        .filter(|r| r.round == 2)
        .map(|r| r.words.len())
        .collect();
    second.sort_unstable();
    assert_eq!(second, vec![8, 16]);
}

#[tokio::test]
async fn weak_partition_refines_and_excludes_losers() {
    let oracle = Arc::new(ScriptedHypothesisOracle::new().otherwise(truth_and_decoys()));
    let config = SolverConfig {
        confidence_floor: 1.0,
        max_rounds: 2,
        ..SolverConfig::default()
    };
    let solver = solver(Arc::clone(&oracle), config);

    let failure = solver.solve(&board()).await.unwrap_err();
    assert!(matches!(
        failure.reports[0].outcome,
        RoundOutcome::BelowConfidenceFloor { .. }
    ));
    assert!(failure.best_partial.complete);
    assert!(failure.uncovered.is_empty());

    // Every group is weak, so the target is the whole board: one request.
    let second: Vec<_> = oracle.requests().into_iter().filter(|r| r.round == 2).collect();
    assert_eq!(second.len(), 1);
    let mut excluded: Vec<&str> = second[0].exclude.iter().map(|h| h.label.as_str()).collect();
    excluded.sort_unstable();
    assert_eq!(excluded, vec!["COLD THINGS", "SHIFTING WEATHER"]);
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_solves_are_identical() {
    let oracle = Arc::new(ScriptedHypothesisOracle::new().otherwise(truth_and_decoys()));
    let solver = solver(oracle, SolverConfig::default());
    let board = board();

    let first = solver.solve(&board).await.unwrap();
    let second = solver.solve(&board).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
