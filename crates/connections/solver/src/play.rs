//! Driving a [`ConnectionsGame`] with the solver.

use std::collections::BTreeSet;

use connections_game::{ConnectionsGame, GameMetrics, GuessOutcome};
use connections_types::{CategoryHypothesis, RoundReport, Word};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::SolverResult;
use crate::solver::RsaSolver;

/// One submitted guess.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuessRecord {
    pub label: String,
    pub words: Vec<Word>,
    pub confidence: f64,
    pub outcome: GuessOutcome,
}

/// Everything a played game produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayReport {
    pub metrics: GameMetrics,
    pub guesses: Vec<GuessRecord>,
    pub won: bool,
}

impl RsaSolver {
    /// Play `game` to the end.
    ///
    /// Each turn solves the remaining board and submits the most confident
    /// group. Wrong guesses are fed back as rejected hypotheses. Stops when
    /// the game is won or lost, or when a solve fails.
    #[instrument(skip(self, game), fields(categories = game.categories().len()))]
    pub async fn play(&self, game: &mut ConnectionsGame) -> SolverResult<PlayReport> {
        let levels = game
            .categories()
            .iter()
            .map(|c| usize::from(c.level) + 1)
            .max()
            .unwrap_or(0)
            .max(game.categories().len());
        let mut metrics = GameMetrics::new(levels);
        let mut guesses = Vec::new();
        let mut rejected: Vec<CategoryHypothesis> = Vec::new();

        while !game.is_over() {
            let Some(board) = game.remaining_board()? else {
                break;
            };
            let solution = match self.solve_rejecting(&board, &rejected).await {
                Ok(solution) => {
                    metrics.add_hallucinations(off_board(&solution.rounds));
                    solution
                }
                Err(failure) => {
                    metrics.add_hallucinations(off_board(&failure.reports));
                    warn!(
                        remaining = board.len(),
                        rounds = failure.rounds,
                        "No accepted partition; stopping play"
                    );
                    break;
                }
            };
            let Some(group) = solution.groups.first() else {
                break;
            };

            let outcome = game.guess(&group.words)?;
            match &outcome {
                GuessOutcome::Correct { category } => {
                    metrics.add_solve(category.level);
                }
                GuessOutcome::Incorrect { .. } => {
                    metrics.add_failed_guess();
                    rejected.push(CategoryHypothesis::new(group.label.clone(), group.words.clone()));
                }
            }
            info!(
                label = %group.label,
                confidence = group.confidence,
                correct = outcome.is_correct(),
                strikes = game.strikes(),
                "Guess submitted"
            );
            guesses.push(GuessRecord {
                label: group.label.clone(),
                words: group.words.clone(),
                confidence: group.confidence,
                outcome,
            });
        }

        Ok(PlayReport {
            metrics,
            guesses,
            won: game.is_won(),
        })
    }
}

/// Distinct off-board words proposed across one solve.
fn off_board(reports: &[RoundReport]) -> BTreeSet<Word> {
    reports
        .iter()
        .flat_map(|r| r.off_board.iter().cloned())
        .collect()
}
