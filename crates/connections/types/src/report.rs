//! Solver loop phases, per-round diagnostics, and the terminal artifacts
//! returned to callers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Word;
use crate::error::RsaError;
use crate::partition::{Group, Partition};

// ── Solver Phase ────────────────────────────────────────────────────────

/// States of the solver loop state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverPhase {
    Generating,
    Scoring,
    Searching,
    Accepted,
    Refining,
    Done,
    Failed,
}

impl SolverPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for SolverPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generating => "generating",
            Self::Scoring => "scoring",
            Self::Searching => "searching",
            Self::Accepted => "accepted",
            Self::Refining => "refining",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ── Round Reports ───────────────────────────────────────────────────────

/// How a single round ended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// Complete partition at or above the confidence floor.
    Accepted { confidence: f64 },
    /// No usable utterances in the pool.
    EmptyCandidateSet,
    /// Search could not cover the board.
    NoCompletePartition { uncovered: usize },
    /// Complete partition, but too weak to accept.
    BelowConfidenceFloor { confidence: f64 },
    /// Oracle calls did not finish before the round deadline and the
    /// surviving results did not yield an accepted partition.
    OracleTimeout { phase: SolverPhase },
}

impl RoundOutcome {
    /// Outcome for a round ended by a recoverable error; `None` for errors
    /// that have no round-level counterpart.
    pub fn recovered(err: &RsaError) -> Option<Self> {
        match err {
            RsaError::EmptyCandidateSet => Some(Self::EmptyCandidateSet),
            RsaError::NoCompletePartition { uncovered } => Some(Self::NoCompletePartition {
                uncovered: *uncovered,
            }),
            RsaError::ExternalOracleTimeout { phase } => Some(Self::OracleTimeout { phase: *phase }),
            _ => None,
        }
    }
}

/// Diagnostics for one solver round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// One-based round number.
    pub round: u32,
    /// Hypothesis requests issued in the generating phase.
    pub requests: usize,
    /// Hypotheses received across all requests.
    pub proposals: usize,
    /// Utterances added to the pool this round.
    pub new_utterances: usize,
    /// Proposals dropped as invalid.
    pub invalid: usize,
    /// Proposed words that are not on the board, sorted.
    pub off_board: Vec<Word>,
    /// Utterances held back because their vectors are still missing.
    pub unscored: usize,
    /// Pool size the engine reasoned over.
    pub pool_size: usize,
    /// Literal rows replaced by the uniform fallback.
    pub degenerate_rows: usize,
    /// Whether the round deadline cut oracle calls short.
    pub timed_out: bool,
    pub outcome: RoundOutcome,
}

// ── Terminal Artifacts ──────────────────────────────────────────────────

/// An accepted partition plus per-group confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Groups ordered by descending confidence.
    pub groups: Vec<Group>,
    /// Mean group confidence.
    pub confidence: f64,
    pub total_score: f64,
    pub rounds_used: u32,
    /// Every phase the state machine entered, in order.
    pub phases: Vec<SolverPhase>,
    pub rounds: Vec<RoundReport>,
}

impl Solution {
    pub fn group_confidences(&self) -> Vec<f64> {
        self.groups.iter().map(|g| g.confidence).collect()
    }

    /// Groups as sorted word lists, convenient for comparisons.
    pub fn word_sets(&self) -> Vec<Vec<Word>> {
        self.groups
            .iter()
            .map(|g| {
                let mut words = g.words.clone();
                words.sort();
                words
            })
            .collect()
    }
}

/// Terminal failure: no accepted partition.
///
/// Always carries the best partial partition found, never a bare error.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[error(
    "no accepted partition after {rounds} round(s); best partial covers {} of {board_size} words",
    .best_partial.covered_count()
)]
pub struct FailureReport {
    /// [`RsaError::RoundBudgetExhausted`], or the unrecoverable error that
    /// stopped the loop early.
    #[source]
    pub cause: RsaError,
    pub rounds: u32,
    pub board_size: usize,
    pub best_partial: Partition,
    /// Board words the best partial leaves uncovered.
    pub uncovered: Vec<Word>,
    pub phases: Vec<SolverPhase>,
    pub reports: Vec<RoundReport>,
}

impl FailureReport {
    pub fn group_confidences(&self) -> Vec<f64> {
        self.best_partial.group_confidences()
    }
}
