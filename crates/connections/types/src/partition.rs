//! Partition candidates: disjoint word groups tagged with their winning utterance.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Word};
use crate::utterance::UtteranceId;

/// One group of a partition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Utterance that won this group.
    pub utterance: UtteranceId,
    /// Category label of the winning utterance.
    pub label: String,
    /// Words in board order.
    pub words: Vec<Word>,
    /// Board indices of `words`.
    pub members: Vec<usize>,
    /// Joint log-likelihood from the inference engine.
    pub score: f64,
    /// Listener probability mass on the claimed words, in `[0, 1]`.
    pub confidence: f64,
}

/// Disjoint groups over a board, complete when they cover every word.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub groups: Vec<Group>,
    pub complete: bool,
    pub total_score: f64,
}

impl Partition {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a partition from groups, checking coverage against the board.
    pub fn from_groups(board: &Board, groups: Vec<Group>) -> Self {
        let total_score = groups.iter().map(|g| g.score).sum();
        let covered: usize = groups.iter().map(|g| g.members.len()).sum();
        let complete = groups.len() == board.groups() && covered == board.len();
        Self {
            groups,
            complete,
            total_score,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of words placed in some group.
    pub fn covered_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }

    /// Board indices covered by the partition, ascending.
    pub fn covered_indices(&self) -> BTreeSet<usize> {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter().copied())
            .collect()
    }

    /// Board words not covered by any group, in board order.
    pub fn uncovered_words(&self, board: &Board) -> Vec<Word> {
        let covered = self.covered_indices();
        board
            .words()
            .iter()
            .enumerate()
            .filter(|(i, _)| !covered.contains(i))
            .map(|(_, w)| w.clone())
            .collect()
    }

    /// Whether no word appears in two groups.
    pub fn is_disjoint(&self) -> bool {
        self.covered_indices().len() == self.covered_count()
    }

    /// Lowest group score, the weakest link of the partition.
    pub fn min_group_score(&self) -> Option<f64> {
        self.groups.iter().map(|g| g.score).reduce(f64::min)
    }

    /// Mean group confidence; zero for an empty partition.
    pub fn confidence(&self) -> f64 {
        if self.groups.is_empty() {
            return 0.0;
        }
        self.groups.iter().map(|g| g.confidence).sum::<f64>() / self.groups.len() as f64
    }

    /// Per-group confidences in group order.
    pub fn group_confidences(&self) -> Vec<f64> {
        self.groups.iter().map(|g| g.confidence).collect()
    }

    /// Order groups by descending confidence, then by first board index.
    pub fn sort_by_confidence(&mut self) {
        self.groups.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.members.first().cmp(&b.members.first()))
        });
    }

    /// Whether `self` ranks ahead of `other` as a partial result:
    /// more groups placed first, then higher total score.
    pub fn better_partial_than(&self, other: &Partition) -> bool {
        match self.groups.len().cmp(&other.groups.len()) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.total_score > other.total_score,
        }
    }
}
