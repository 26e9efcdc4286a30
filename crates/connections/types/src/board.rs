//! Board words and the immutable puzzle board.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

/// Largest board the partition search can index (word sets are 128-bit masks).
pub const MAX_BOARD_WORDS: usize = 128;

// ── Word ────────────────────────────────────────────────────────────────

/// An atomic board token.
///
/// Normalised on construction: surrounding whitespace trimmed, inner runs of
/// whitespace collapsed to one space, uppercased.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Word(String);

impl Word {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normalise free text the same way words are normalised.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

impl From<String> for Word {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Word {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Board ───────────────────────────────────────────────────────────────

/// Serialised shape of a board; validated on the way in.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct BoardRepr {
    words: Vec<Word>,
    group_size: usize,
    groups: usize,
}

/// An ordered sequence of unique words, `group_size * groups` long.
///
/// Loaded once per puzzle and read-only afterwards; every other structure
/// refers to words by their index on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr", into = "BoardRepr")]
pub struct Board {
    words: Vec<Word>,
    group_size: usize,
    groups: usize,
    index: HashMap<Word, usize>,
}

impl Board {
    /// Build and validate a board.
    pub fn new<I, W>(words: I, group_size: usize, groups: usize) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = W>,
        W: Into<Word>,
    {
        if group_size == 0 || groups == 0 {
            return Err(BoardError::InvalidShape { group_size, groups });
        }
        let expected = group_size * groups;
        if expected > MAX_BOARD_WORDS {
            return Err(BoardError::TooLarge {
                max: MAX_BOARD_WORDS,
                actual: expected,
            });
        }

        let words: Vec<Word> = words.into_iter().map(Into::into).collect();
        if words.len() != expected {
            return Err(BoardError::WrongSize {
                expected,
                actual: words.len(),
            });
        }

        let mut index = HashMap::with_capacity(words.len());
        for (position, word) in words.iter().enumerate() {
            if word.is_empty() {
                return Err(BoardError::EmptyWord { position });
            }
            if index.insert(word.clone(), position).is_some() {
                return Err(BoardError::DuplicateWord(word.clone()));
            }
        }

        Ok(Self {
            words,
            group_size,
            groups,
            index,
        })
    }

    /// A standard sixteen-word board of four groups of four.
    pub fn standard<I, W>(words: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = W>,
        W: Into<Word>,
    {
        Self::new(words, 4, 4)
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn word(&self, index: usize) -> Option<&Word> {
        self.words.get(index)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Board position of a word, if it is on the board.
    pub fn index_of(&self, word: &Word) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn contains(&self, word: &Word) -> bool {
        self.index.contains_key(word)
    }

    /// Words at the given board positions, in the given order.
    pub fn words_at(&self, indices: &[usize]) -> Vec<Word> {
        indices
            .iter()
            .filter_map(|&i| self.words.get(i).cloned())
            .collect()
    }
}

impl TryFrom<BoardRepr> for Board {
    type Error = BoardError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        Board::new(repr.words, repr.group_size, repr.groups)
    }
}

impl From<Board> for BoardRepr {
    fn from(board: Board) -> Self {
        BoardRepr {
            words: board.words,
            group_size: board.group_size,
            groups: board.groups,
        }
    }
}
