//! Puzzle categories and the answers-dataset JSON format.

use std::collections::BTreeSet;

use connections_types::{Board, Word};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// One answer group of a puzzle.
///
/// `level` is the difficulty tier, 0 (easiest) to 3.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleCategory {
    pub level: u8,
    pub group: String,
    pub members: Vec<Word>,
}

impl PuzzleCategory {
    pub fn new<I, W>(level: u8, group: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Word>,
    {
        Self {
            level,
            group: group.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `words` is exactly this category's member set, in any order.
    pub fn matches(&self, words: &[Word]) -> bool {
        let guess: BTreeSet<&Word> = words.iter().collect();
        let members: BTreeSet<&Word> = self.members.iter().collect();
        guess.len() == words.len() && guess == members
    }

    /// How many of `words` belong to this category.
    pub fn overlap(&self, words: &[Word]) -> usize {
        words.iter().filter(|w| self.members.contains(w)).count()
    }
}

/// A single game: its answer categories plus optional dataset metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub answers: Vec<PuzzleCategory>,
}

impl Puzzle {
    pub fn from_json(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every word of the puzzle, sorted so the board does not leak grouping.
    pub fn words(&self) -> Vec<Word> {
        let mut words: Vec<Word> = self
            .answers
            .iter()
            .flat_map(|c| c.members.iter().cloned())
            .collect();
        words.sort();
        words
    }

    /// The solver board for this puzzle, group size taken from the first
    /// category.
    pub fn board(&self) -> GameResult<Board> {
        let first = self.answers.first().ok_or(GameError::EmptyPuzzle)?;
        Ok(Board::new(
            self.words(),
            first.members.len(),
            self.answers.len(),
        )?)
    }
}

/// A list of games, as stored in the public answers dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PuzzleSet {
    pub puzzles: Vec<Puzzle>,
}

impl PuzzleSet {
    pub fn from_json(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Puzzle> {
        self.puzzles.iter()
    }

    pub fn by_id(&self, id: u64) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| p.id == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: &str = r#"{
        "id": 1,
        "date": "2023-06-12",
        "answers": [
            {"level": 0, "group": "WET WEATHER", "members": ["HAIL", "RAIN", "SLEET", "SNOW"]},
            {"level": 1, "group": "NBA TEAMS", "members": ["BUCKS", "HEAT", "JAZZ", "NETS"]},
            {"level": 2, "group": "KEYBOARD KEYS", "members": ["OPTION", "RETURN", "SHIFT", "TAB"]},
            {"level": 3, "group": "PALINDROMES", "members": ["KAYAK", "LEVEL", "MOM", "RACECAR"]}
        ]
    }"#;

    #[test]
    fn parses_single_game() {
        let puzzle = Puzzle::from_json(GAME).unwrap();
        assert_eq!(puzzle.id, Some(1));
        assert_eq!(puzzle.answers.len(), 4);
        assert_eq!(puzzle.answers[3].group, "PALINDROMES");
        assert_eq!(puzzle.answers[0].members[0], Word::new("hail"));
    }

    #[test]
    fn board_is_sorted_and_shaped() {
        let board = Puzzle::from_json(GAME).unwrap().board().unwrap();
        assert_eq!(board.len(), 16);
        assert_eq!(board.group_size(), 4);
        assert_eq!(board.groups(), 4);
        assert_eq!(board.words()[0], Word::new("BUCKS"));
    }

    #[test]
    fn parses_game_list_without_metadata() {
        let json = r#"[
            {"answers": [{"level": 0, "group": "A", "members": ["X", "Y"]}]},
            {"id": 7, "answers": []}
        ]"#;
        let set = PuzzleSet::from_json(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.puzzles[0].id, None);
        assert!(set.by_id(7).is_some());
        assert!(matches!(
            set.by_id(7).unwrap().board(),
            Err(GameError::EmptyPuzzle)
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Puzzle::from_json("{\"answers\": 3}"),
            Err(GameError::Parse(_))
        ));
    }

    #[test]
    fn category_matching_ignores_order_and_case() {
        let cat = PuzzleCategory::new(0, "WET WEATHER", ["HAIL", "RAIN", "SLEET", "SNOW"]);
        let guess: Vec<Word> = ["snow", "hail", "rain", "sleet"]
            .into_iter()
            .map(Word::new)
            .collect();
        assert!(cat.matches(&guess));

        let dup: Vec<Word> = ["SNOW", "SNOW", "HAIL", "RAIN"]
            .into_iter()
            .map(Word::new)
            .collect();
        assert!(!cat.matches(&dup));
        assert_eq!(cat.overlap(&dup), 4);
    }
}
