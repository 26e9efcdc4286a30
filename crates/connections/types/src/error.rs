//! Error taxonomy shared by the engine, the partition search and the solver loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Word;
use crate::report::SolverPhase;

/// Errors raised while constructing a [`Board`](crate::Board).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    /// Group size or group count is zero.
    #[error("invalid board shape: {groups} group(s) of {group_size}")]
    InvalidShape { group_size: usize, groups: usize },

    /// The board exceeds the number of words the search can index.
    #[error("board of {actual} words exceeds the maximum of {max}")]
    TooLarge { max: usize, actual: usize },

    /// Word count does not match `group_size * groups`.
    #[error("expected {expected} words, got {actual}")]
    WrongSize { expected: usize, actual: usize },

    /// A word normalised to the empty string.
    #[error("word at position {position} is empty")]
    EmptyWord { position: usize },

    /// The same word appears twice.
    #[error("duplicate word: {0}")]
    DuplicateWord(Word),
}

/// Errors raised by the inference engine, the search and the solver loop.
///
/// Recoverable errors are handled inside the solver loop and turned into a
/// narrowed request for the next round. The rest end the solve and become the
/// cause of its [`FailureReport`](crate::FailureReport).
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum RsaError {
    /// Malformed candidate: wrong size, duplicate words, or words off the board.
    #[error("invalid utterance '{label}': {reason}")]
    InvalidUtterance { label: String, reason: String },

    /// Zero usable utterances were supplied.
    #[error("no candidate utterances to reason about")]
    EmptyCandidateSet,

    /// No conflict-free combination of utterances covers the board.
    #[error("no complete partition: {uncovered} word(s) left uncovered")]
    NoCompletePartition { uncovered: usize },

    /// An external oracle did not answer before the round deadline.
    #[error("external oracle timed out during {phase}")]
    ExternalOracleTimeout { phase: SolverPhase },

    /// The solver ran out of rounds without an accepted partition.
    #[error("round budget exhausted after {rounds} round(s)")]
    RoundBudgetExhausted { rounds: u32 },

    /// Board validation failed.
    #[error("invalid board: {0}")]
    InvalidBoard(#[from] BoardError),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl RsaError {
    /// Shorthand for [`RsaError::InvalidUtterance`].
    pub fn invalid_utterance(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUtterance {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Whether the solver loop may recover from this error by refining.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::RoundBudgetExhausted { .. } | Self::InvalidBoard(_) | Self::Configuration(_)
        )
    }
}

/// Result type for solver operations.
pub type RsaResult<T> = Result<T, RsaError>;
