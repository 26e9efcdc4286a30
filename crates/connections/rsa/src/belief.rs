//! The unrolled speaker/listener ladder.
//!
//! Level 0 is the literal listener. Each pragmatic level `d` derives a
//! speaker from listener `d - 1` and a listener from that speaker. The
//! mutual recursion is a fixed sequence of table transforms, one pair per
//! level, so depth is bounded by construction.

use connections_types::RationalityConfig;

use crate::literal::LiteralMeaningTable;
use crate::softmax::{log_softmax, log_uniform};

type LogTable = Vec<Vec<f64>>;

/// Log-space belief tables for every reasoning level.
#[derive(Clone, Debug, PartialEq)]
pub struct BeliefLadder {
    utterances: usize,
    words: usize,
    /// `listeners[d][u][w] = ln L_d(w | u)` for `d` in `0..=depth`.
    listeners: Vec<LogTable>,
    /// `speakers[d - 1][w][u] = ln S_d(u | w)` for `d` in `1..=depth`.
    speakers: Vec<LogTable>,
}

impl BeliefLadder {
    pub fn build(table: &LiteralMeaningTable, rationality: &RationalityConfig, depth: u32) -> Self {
        let utterances = table.utterances();
        let words = table.words();

        let literal: LogTable = (0..utterances)
            .map(|u| match table.row(u) {
                Some(row) if !table.is_degenerate(u) => log_softmax(row, rationality.alpha0),
                _ => log_uniform(words),
            })
            .collect();

        let mut listeners = Vec::with_capacity(depth as usize + 1);
        let mut speakers = Vec::with_capacity(depth as usize);
        listeners.push(literal);

        for _ in 0..depth {
            let previous = &listeners[listeners.len() - 1];
            let speaker = speak(previous, utterances, words, rationality.alpha1);
            let listener = listen(&speaker, utterances, words, rationality.alpha2);
            speakers.push(speaker);
            listeners.push(listener);
        }

        Self {
            utterances,
            words,
            listeners,
            speakers,
        }
    }

    pub fn depth(&self) -> u32 {
        self.speakers.len() as u32
    }

    pub fn utterances(&self) -> usize {
        self.utterances
    }

    pub fn words(&self) -> usize {
        self.words
    }

    /// `ln L_depth(· | utterance)` over board words.
    pub fn listener(&self, depth: u32, utterance: usize) -> Option<&[f64]> {
        self.listeners
            .get(depth as usize)?
            .get(utterance)
            .map(Vec::as_slice)
    }

    /// `ln S_depth(· | word)` over utterances; `depth` starts at 1.
    pub fn speaker(&self, depth: u32, word: usize) -> Option<&[f64]> {
        let level = (depth as usize).checked_sub(1)?;
        self.speakers.get(level)?.get(word).map(Vec::as_slice)
    }

    /// Listener at the deepest level.
    pub fn final_listener(&self, utterance: usize) -> Option<&[f64]> {
        self.listener(self.depth(), utterance)
    }
}

/// Speaker for each word: softmax over utterances of `alpha * ln L(w | u)`.
fn speak(listener: &LogTable, utterances: usize, words: usize, alpha: f64) -> LogTable {
    (0..words)
        .map(|w| {
            let utility: Vec<f64> = (0..utterances).map(|u| listener[u][w]).collect();
            log_softmax(&utility, alpha)
        })
        .collect()
}

/// Listener for each utterance: softmax over words of `alpha * ln S(u | w)`,
/// under a uniform word prior.
fn listen(speaker: &LogTable, utterances: usize, words: usize, alpha: f64) -> LogTable {
    (0..utterances)
        .map(|u| {
            let utility: Vec<f64> = (0..words).map(|w| speaker[w][u]).collect();
            log_softmax(&utility, alpha)
        })
        .collect()
}
