//! Playing full games through the solver.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use connections_game::{ConnectionsGame, GuessOutcome, Puzzle, PuzzleCategory};
use connections_oracle::{
    HypothesisOracle, LexicalEmbeddingOracle, OracleResult, ProposalRequest,
    ScriptedHypothesisOracle,
};
use connections_solver::RsaSolver;
use connections_types::{CategoryHypothesis, SolverConfig, Word};

use common::*;

#[tokio::test]
async fn plays_a_clean_game_to_a_win() {
    init_tracing();
    let puzzle = Puzzle::from_json(PUZZLE_JSON).unwrap();
    let mut game = ConnectionsGame::from_puzzle(&puzzle).unwrap();
    let oracle = Arc::new(ScriptedHypothesisOracle::new().otherwise(truth()));
    let solver = solver(oracle, SolverConfig::default());

    let report = solver.play(&mut game).await.unwrap();

    assert!(report.won);
    assert!(game.is_won());
    assert_eq!(report.guesses.len(), 4);
    assert!(report.guesses.iter().all(|g| g.outcome.is_correct()));
    assert_eq!(report.metrics.points(), 20);
    assert_eq!(report.metrics.failed_guesses, 0);
    assert!((report.metrics.solve_rate() - 100.0).abs() < 1e-9);
    assert!(report.metrics.hallucinated_words.is_empty());

    let mut order = report.metrics.solve_order.clone();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn wrong_guess_is_fed_back_and_play_stops_when_stuck() {
    let mut game = ConnectionsGame::new(
        vec![
            PuzzleCategory::new(0, "INSECTS", ["ANT", "BEE"]),
            PuzzleCategory::new(1, "PETS", ["CAT", "DOG"]),
        ],
        2,
        4,
    )
    .unwrap();
    let oracle = Arc::new(ScriptedHypothesisOracle::new().otherwise(vec![
        CategoryHypothesis::new("A WORDS", ["ANT", "CAT"]),
        CategoryHypothesis::new("B WORDS", ["BEE", "DOG"]),
    ]));
    let config = SolverConfig {
        confidence_floor: 0.0,
        max_rounds: 1,
        ..SolverConfig::default()
    };
    let solver = RsaSolver::new(
        oracle.clone(),
        Arc::new(LexicalEmbeddingOracle::default()),
        config,
    )
    .unwrap();

    let report = solver.play(&mut game).await.unwrap();

    assert!(!report.won);
    assert_eq!(report.guesses.len(), 1);
    assert_eq!(
        report.guesses[0].outcome,
        GuessOutcome::Incorrect { one_away: true }
    );
    assert_eq!(report.metrics.failed_guesses, 1);
    assert_eq!(report.metrics.points(), 0);
    assert_eq!(game.strikes(), 1);
    assert!(!game.is_over());

    // The second solve told the oracle about the rejected group.
    let last = oracle.requests().pop().unwrap();
    assert_eq!(last.exclude.len(), 1);
    assert_eq!(last.exclude[0].label, report.guesses[0].label);
}

/// Answers like the scripted oracle, plus one group naming words that are
/// not on any board.
struct Careless(ScriptedHypothesisOracle);

#[async_trait]
impl HypothesisOracle for Careless {
    async fn propose(&self, request: &ProposalRequest) -> OracleResult<Vec<CategoryHypothesis>> {
        let mut answer = self.0.propose(request).await?;
        answer.push(CategoryHypothesis::new("WINTER", ["SNOW", "SLED", "HAIL", "ICE"]));
        Ok(answer)
    }
}

#[tokio::test]
async fn off_board_proposals_are_counted_as_hallucinations() {
    let puzzle = Puzzle::from_json(PUZZLE_JSON).unwrap();
    let mut game = ConnectionsGame::from_puzzle(&puzzle).unwrap();
    let oracle = Arc::new(Careless(ScriptedHypothesisOracle::new().otherwise(truth())));
    let solver = RsaSolver::new(oracle, embeddings(), SolverConfig::default()).unwrap();

    let first = solver.solve(&board()).await.unwrap();
    assert_eq!(first.rounds[0].off_board, vec![Word::new("ICE"), Word::new("SLED")]);
    assert_eq!(first.rounds[0].invalid, 1);

    let report = solver.play(&mut game).await.unwrap();
    assert!(report.won);
    assert!(report.guesses.iter().all(|g| g.outcome.is_correct()));
    let hallucinated = &report.metrics.hallucinated_words;
    assert!(hallucinated.contains(&Word::new("SLED")));
    assert!(hallucinated.contains(&Word::new("ICE")));
    assert!(!hallucinated.contains(&Word::new("KAYAK")));
}
