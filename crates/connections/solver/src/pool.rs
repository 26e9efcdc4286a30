//! The utterance pool one solve reasons over.

use std::collections::{BTreeMap, BTreeSet};

use connections_types::{Board, CategoryHypothesis, Utterance, UtteranceId, Word};

/// What happened to an utterance offered to the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Offer {
    /// Queued until its literal row can be computed.
    Queued,
    /// Same id already known.
    Duplicate,
    /// Claims a word set that was already rejected.
    Barred,
}

/// Utterances keyed by id.
///
/// Scored utterances carry their literal row over the board; pending ones
/// wait for embeddings. Iteration is always in id order.
#[derive(Clone, Debug, Default)]
pub struct UtterancePool {
    scored: BTreeMap<UtteranceId, (Utterance, Vec<f64>)>,
    pending: BTreeMap<UtteranceId, Utterance>,
    barred: BTreeSet<Vec<Word>>,
}

impl UtterancePool {
    /// A pool refusing every word set claimed by `rejected`.
    pub fn barring(rejected: &[CategoryHypothesis]) -> Self {
        Self {
            barred: rejected.iter().map(|h| sorted(h.words.clone())).collect(),
            ..Self::default()
        }
    }

    pub fn offer(&mut self, utterance: Utterance, board: &Board) -> Offer {
        if self.contains(&utterance.id) {
            return Offer::Duplicate;
        }
        if self.barred.contains(&sorted(board.words_at(&utterance.members))) {
            return Offer::Barred;
        }
        self.pending.insert(utterance.id, utterance);
        Offer::Queued
    }

    pub fn contains(&self, id: &UtteranceId) -> bool {
        self.scored.contains_key(id) || self.pending.contains_key(id)
    }

    /// Texts the pending utterances need embedded.
    pub fn pending_texts(&self) -> Vec<String> {
        self.pending
            .values()
            .map(|u| u.hypothesis.meaning_text().to_string())
            .collect()
    }

    /// Move every pending utterance whose row `literal` can produce into the
    /// scored pool. Returns how many moved.
    pub fn promote<F>(&mut self, mut literal: F) -> usize
    where
        F: FnMut(&Utterance) -> Option<Vec<f64>>,
    {
        let ready: Vec<(UtteranceId, Vec<f64>)> = self
            .pending
            .iter()
            .filter_map(|(id, u)| literal(u).map(|row| (*id, row)))
            .collect();
        let moved = ready.len();
        for (id, row) in ready {
            if let Some(utterance) = self.pending.remove(&id) {
                self.scored.insert(id, (utterance, row));
            }
        }
        moved
    }

    /// Scored utterances.
    pub fn len(&self) -> usize {
        self.scored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scored.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Scored utterances and their literal rows, in matching order.
    pub fn snapshot(&self) -> (Vec<Utterance>, Vec<Vec<f64>>) {
        self.scored
            .values()
            .map(|(u, row)| (u.clone(), row.clone()))
            .unzip()
    }

    /// Hypotheses of scored utterances not in `keep`.
    pub fn hypotheses_except(&self, keep: &BTreeSet<UtteranceId>) -> Vec<CategoryHypothesis> {
        self.scored
            .iter()
            .filter(|(id, _)| !keep.contains(id))
            .map(|(_, (u, _))| u.hypothesis.clone())
            .collect()
    }
}

fn sorted(mut words: Vec<Word>) -> Vec<Word> {
    words.sort();
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(["ANT", "BEE", "CAT", "DOG"], 2, 2).unwrap()
    }

    fn utterance(board: &Board, label: &str, words: [&str; 2]) -> Utterance {
        Utterance::resolve(board, CategoryHypothesis::new(label, words)).unwrap()
    }

    #[test]
    fn offers_are_deduplicated_and_barred() {
        let board = board();
        let rejected = [CategoryHypothesis::new("WRONG", ["DOG", "ANT"])];
        let mut pool = UtterancePool::barring(&rejected);

        assert_eq!(pool.offer(utterance(&board, "INSECTS", ["ANT", "BEE"]), &board), Offer::Queued);
        assert_eq!(pool.offer(utterance(&board, "insects", ["BEE", "ANT"]), &board), Offer::Duplicate);
        assert_eq!(pool.offer(utterance(&board, "OTHER", ["ANT", "DOG"]), &board), Offer::Barred);
        assert_eq!(pool.pending_len(), 1);
        assert!(pool.is_empty());
        assert_eq!(pool.pending_texts(), vec!["INSECTS".to_string()]);
    }

    #[test]
    fn promotion_keeps_unready_utterances_pending() {
        let board = board();
        let mut pool = UtterancePool::default();
        pool.offer(utterance(&board, "INSECTS", ["ANT", "BEE"]), &board);
        pool.offer(utterance(&board, "PETS", ["CAT", "DOG"]), &board);

        let moved = pool.promote(|u| (u.label() == "PETS").then(|| vec![0.0, 0.0, 1.0, 1.0]));
        assert_eq!(moved, 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.pending_len(), 1);

        let (utterances, rows) = pool.snapshot();
        assert_eq!(utterances[0].label(), "PETS");
        assert_eq!(rows[0], vec![0.0, 0.0, 1.0, 1.0]);

        let keep: BTreeSet<UtteranceId> = [utterances[0].id].into_iter().collect();
        assert!(pool.hypotheses_except(&keep).is_empty());
        assert_eq!(pool.hypotheses_except(&BTreeSet::new()).len(), 1);
    }
}
