//! Per-game scoring.

use connections_types::Word;
use serde::{Deserialize, Serialize};

/// Points awarded for each solved category.
pub const POINTS_PER_SOLVE: u32 = 5;

/// Points deducted for each failed guess.
pub const PENALTY_PER_FAILED_GUESS: u32 = 1;

/// Score sheet for one game.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Solved flag per difficulty level.
    pub solves: Vec<bool>,
    /// Levels in the order they were solved.
    pub solve_order: Vec<u8>,
    pub failed_guesses: u32,
    /// Words the solver's oracle proposed that were not on the remaining
    /// board. Guesses themselves are always built from board words.
    pub hallucinated_words: Vec<Word>,
    points: u32,
}

impl GameMetrics {
    pub fn new(levels: usize) -> Self {
        Self {
            solves: vec![false; levels],
            ..Self::default()
        }
    }

    /// Record a solved level. Returns `false` for an unknown or already
    /// solved level, which scores nothing.
    pub fn add_solve(&mut self, level: u8) -> bool {
        match self.solves.get_mut(usize::from(level)) {
            Some(solved) if !*solved => {
                *solved = true;
                self.solve_order.push(level);
                self.points += POINTS_PER_SOLVE;
                true
            }
            _ => false,
        }
    }

    pub fn add_failed_guess(&mut self) {
        self.failed_guesses += 1;
    }

    pub fn add_hallucinations(&mut self, words: impl IntoIterator<Item = Word>) {
        self.hallucinated_words.extend(words);
    }

    pub fn solved_count(&self) -> usize {
        self.solves.iter().filter(|&&s| s).count()
    }

    /// Percentage of levels solved.
    pub fn solve_rate(&self) -> f64 {
        if self.solves.is_empty() {
            return 0.0;
        }
        self.solved_count() as f64 / self.solves.len() as f64 * 100.0
    }

    /// Solve points minus guess penalties, never below zero.
    pub fn points(&self) -> u32 {
        self.points
            .saturating_sub(self.failed_guesses * PENALTY_PER_FAILED_GUESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_solves_and_penalties() {
        let mut metrics = GameMetrics::new(4);
        assert!(metrics.add_solve(2));
        assert!(metrics.add_solve(0));
        metrics.add_failed_guess();
        assert_eq!(metrics.solve_order, vec![2, 0]);
        assert_eq!(metrics.solves, vec![true, false, true, false]);
        assert_eq!(metrics.points(), 9);
        assert!((metrics.solve_rate() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn repeat_and_unknown_levels_score_nothing() {
        let mut metrics = GameMetrics::new(4);
        assert!(metrics.add_solve(1));
        assert!(!metrics.add_solve(1));
        assert!(!metrics.add_solve(9));
        assert_eq!(metrics.points(), 5);
        assert_eq!(metrics.solve_order, vec![1]);
    }

    #[test]
    fn points_floor_at_zero() {
        let mut metrics = GameMetrics::new(4);
        metrics.add_solve(0);
        for _ in 0..8 {
            metrics.add_failed_guess();
        }
        assert_eq!(metrics.points(), 0);
        assert_eq!(GameMetrics::default().solve_rate(), 0.0);
    }

    #[test]
    fn records_hallucinations() {
        let mut metrics = GameMetrics::new(4);
        metrics.add_hallucinations([Word::new("unicorn")]);
        assert_eq!(metrics.hallucinated_words, vec![Word::new("UNICORN")]);
    }
}
