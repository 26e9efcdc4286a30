use connections_types::{BoardError, Word};
use thiserror::Error;

/// Errors raised by the game simulator and puzzle loading.
#[derive(Debug, Error)]
pub enum GameError {
    /// A category does not have `group_size` members.
    #[error("category '{group}' has {actual} members, expected {expected}")]
    InvalidCategory {
        group: String,
        expected: usize,
        actual: usize,
    },

    /// A word appears in more than one category, or twice in one.
    #[error("word {0} appears more than once in the puzzle")]
    DuplicateWord(Word),

    /// A guess with the wrong number of distinct words.
    #[error("a guess needs {expected} distinct words, got {actual}")]
    InvalidGuess { expected: usize, actual: usize },

    /// The game already ended, won or lost.
    #[error("game over after {strikes} strike(s)")]
    GameOver { strikes: u32 },

    #[error("puzzle has no categories")]
    EmptyPuzzle,

    #[error("invalid board: {0}")]
    Board(#[from] BoardError),

    #[error("puzzle JSON error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
