//! The Connections game simulator.

use std::collections::HashSet;

use connections_types::{Board, Word};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GameError, GameResult};
use crate::puzzle::{Puzzle, PuzzleCategory};

/// Mistakes allowed before the game ends.
pub const DEFAULT_MAX_STRIKES: u32 = 4;

/// Result of a single guess.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuessOutcome {
    Correct { category: PuzzleCategory },
    /// Wrong guess; `one_away` when all but one word share a category.
    Incorrect { one_away: bool },
}

impl GuessOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct { .. })
    }
}

/// A game in progress: unsolved categories, solved ones in solve order, and
/// the strike count.
#[derive(Clone, Debug)]
pub struct ConnectionsGame {
    categories: Vec<PuzzleCategory>,
    remaining: Vec<PuzzleCategory>,
    solved: Vec<PuzzleCategory>,
    group_size: usize,
    max_strikes: u32,
    strikes: u32,
}

impl ConnectionsGame {
    pub fn new(
        categories: Vec<PuzzleCategory>,
        group_size: usize,
        max_strikes: u32,
    ) -> GameResult<Self> {
        if categories.is_empty() {
            return Err(GameError::EmptyPuzzle);
        }
        let mut seen = HashSet::new();
        for category in &categories {
            if category.members.len() != group_size {
                return Err(GameError::InvalidCategory {
                    group: category.group.clone(),
                    expected: group_size,
                    actual: category.members.len(),
                });
            }
            for word in &category.members {
                if !seen.insert(word.clone()) {
                    return Err(GameError::DuplicateWord(word.clone()));
                }
            }
        }

        Ok(Self {
            remaining: categories.clone(),
            categories,
            solved: Vec::new(),
            group_size,
            max_strikes,
            strikes: 0,
        })
    }

    /// A game over a dataset puzzle with the default strike limit.
    pub fn from_puzzle(puzzle: &Puzzle) -> GameResult<Self> {
        let group_size = puzzle
            .answers
            .first()
            .map(|c| c.members.len())
            .ok_or(GameError::EmptyPuzzle)?;
        Self::new(puzzle.answers.clone(), group_size, DEFAULT_MAX_STRIKES)
    }

    /// Submit a guess of `group_size` distinct words.
    ///
    /// A malformed guess is rejected without costing a strike. Any other
    /// miss, including words not on the board, costs one.
    pub fn guess(&mut self, words: &[Word]) -> GameResult<GuessOutcome> {
        if self.is_over() {
            return Err(GameError::GameOver {
                strikes: self.strikes,
            });
        }
        let distinct: HashSet<&Word> = words.iter().collect();
        if words.len() != self.group_size || distinct.len() != words.len() {
            return Err(GameError::InvalidGuess {
                expected: self.group_size,
                actual: distinct.len(),
            });
        }

        if let Some(position) = self.remaining.iter().position(|c| c.matches(words)) {
            let category = self.remaining.remove(position);
            debug!(group = %category.group, level = category.level, "correct guess");
            self.solved.push(category.clone());
            return Ok(GuessOutcome::Correct { category });
        }

        self.strikes += 1;
        let one_away = self
            .remaining
            .iter()
            .any(|c| c.overlap(words) + 1 == self.group_size);
        debug!(strikes = self.strikes, one_away, "incorrect guess");
        Ok(GuessOutcome::Incorrect { one_away })
    }

    /// Unsolved words, sorted.
    pub fn remaining_words(&self) -> Vec<Word> {
        let mut words: Vec<Word> = self
            .remaining
            .iter()
            .flat_map(|c| c.members.iter().cloned())
            .collect();
        words.sort();
        words
    }

    /// Board of the unsolved words, or `None` once everything is solved.
    pub fn remaining_board(&self) -> GameResult<Option<Board>> {
        if self.remaining.is_empty() {
            return Ok(None);
        }
        Ok(Some(Board::new(
            self.remaining_words(),
            self.group_size,
            self.remaining.len(),
        )?))
    }

    pub fn solved_categories(&self) -> &[PuzzleCategory] {
        &self.solved
    }

    pub fn categories(&self) -> &[PuzzleCategory] {
        &self.categories
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    pub fn max_strikes(&self) -> u32 {
        self.max_strikes
    }

    pub fn is_won(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn is_over(&self) -> bool {
        self.is_won() || self.strikes >= self.max_strikes
    }

    /// Back to the initial state: nothing solved, no strikes.
    pub fn reset(&mut self) {
        self.remaining = self.categories.clone();
        self.solved.clear();
        self.strikes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(raw: &[&str]) -> Vec<Word> {
        raw.iter().map(Word::new).collect()
    }

    fn small_game(max_strikes: u32) -> ConnectionsGame {
        ConnectionsGame::new(
            vec![
                PuzzleCategory::new(0, "WEATHER", ["HAIL", "RAIN", "SNOW"]),
                PuzzleCategory::new(1, "PETS", ["CAT", "DOG", "FISH"]),
            ],
            3,
            max_strikes,
        )
        .unwrap()
    }

    #[test]
    fn validates_categories() {
        let short = ConnectionsGame::new(
            vec![PuzzleCategory::new(0, "A", ["X", "Y"])],
            3,
            4,
        );
        assert!(matches!(short, Err(GameError::InvalidCategory { actual: 2, .. })));

        let dup = ConnectionsGame::new(
            vec![
                PuzzleCategory::new(0, "A", ["X", "Y"]),
                PuzzleCategory::new(1, "B", ["Y", "Z"]),
            ],
            2,
            4,
        );
        assert!(matches!(dup, Err(GameError::DuplicateWord(w)) if w.as_str() == "Y"));

        assert!(matches!(
            ConnectionsGame::new(vec![], 4, 4),
            Err(GameError::EmptyPuzzle)
        ));
    }

    #[test]
    fn correct_guess_removes_category() {
        let mut game = small_game(4);
        let outcome = game.guess(&words(&["snow", "hail", "rain"])).unwrap();
        assert!(outcome.is_correct());
        assert_eq!(game.remaining_words(), words(&["CAT", "DOG", "FISH"]));
        assert_eq!(game.solved_categories()[0].group, "WEATHER");
        assert!(!game.is_over());

        game.guess(&words(&["CAT", "DOG", "FISH"])).unwrap();
        assert!(game.is_won());
        assert!(game.is_over());
        assert!(game.remaining_board().unwrap().is_none());
        assert!(matches!(
            game.guess(&words(&["CAT", "DOG", "FISH"])),
            Err(GameError::GameOver { strikes: 0 })
        ));
    }

    #[test]
    fn incorrect_guess_costs_a_strike() {
        let mut game = small_game(2);
        let outcome = game.guess(&words(&["HAIL", "RAIN", "CAT"])).unwrap();
        assert_eq!(outcome, GuessOutcome::Incorrect { one_away: true });
        assert_eq!(game.strikes(), 1);

        let outcome = game.guess(&words(&["HAIL", "CAT", "UNICORN"])).unwrap();
        assert_eq!(outcome, GuessOutcome::Incorrect { one_away: false });
        assert!(game.is_over());
        assert!(!game.is_won());
        assert!(matches!(
            game.guess(&words(&["HAIL", "RAIN", "SNOW"])),
            Err(GameError::GameOver { strikes: 2 })
        ));
    }

    #[test]
    fn malformed_guess_is_free() {
        let mut game = small_game(4);
        assert!(matches!(
            game.guess(&words(&["HAIL", "RAIN"])),
            Err(GameError::InvalidGuess { expected: 3, actual: 2 })
        ));
        assert!(matches!(
            game.guess(&words(&["HAIL", "HAIL", "RAIN"])),
            Err(GameError::InvalidGuess { expected: 3, actual: 2 })
        ));
        assert_eq!(game.strikes(), 0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut game = small_game(4);
        game.guess(&words(&["HAIL", "RAIN", "SNOW"])).unwrap();
        game.guess(&words(&["HAIL", "CAT", "DOG"])).unwrap();
        game.reset();
        assert_eq!(game.strikes(), 0);
        assert!(game.solved_categories().is_empty());
        assert_eq!(game.remaining_words().len(), 6);
        let board = game.remaining_board().unwrap().unwrap();
        assert_eq!(board.groups(), 2);
    }

    #[test]
    fn builds_from_puzzle() {
        let puzzle = Puzzle {
            id: None,
            date: None,
            answers: vec![
                PuzzleCategory::new(0, "A", ["W", "X"]),
                PuzzleCategory::new(1, "B", ["Y", "Z"]),
            ],
        };
        let game = ConnectionsGame::from_puzzle(&puzzle).unwrap();
        assert_eq!(game.group_size(), 2);
        assert_eq!(game.max_strikes(), DEFAULT_MAX_STRIKES);
        assert_eq!(game.categories().len(), 2);
    }
}
