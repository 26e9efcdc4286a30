use connections_types::{BoardError, RsaError, MAX_BOARD_WORDS};
use thiserror::Error;

use crate::search::Selection;

/// Errors raised by the partition search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// No conflict-free combination of candidates covers the board.
    ///
    /// Carries the best partial selection: most groups placed, then highest
    /// total score.
    #[error("no complete partition: {uncovered} word(s) left uncovered")]
    NoCompletePartition { partial: Selection, uncovered: usize },

    /// The board has more words than a word mask can index.
    #[error("board of {words} words exceeds the maximum of {}", MAX_BOARD_WORDS)]
    TooLarge { words: usize },
}

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

impl From<SearchError> for RsaError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NoCompletePartition { uncovered, .. } => {
                RsaError::NoCompletePartition { uncovered }
            }
            SearchError::TooLarge { words } => RsaError::InvalidBoard(BoardError::TooLarge {
                max: MAX_BOARD_WORDS,
                actual: words,
            }),
        }
    }
}
