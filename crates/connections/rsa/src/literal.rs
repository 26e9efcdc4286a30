use connections_types::{RsaError, RsaResult};
use serde::{Deserialize, Serialize};

/// Literal similarity of each utterance to each board word.
///
/// Row `u` holds the scores for utterance `u` over every board word, in
/// board order. Non-finite and negative scores are clamped to zero on
/// construction; a row that is then all zero is marked degenerate and the
/// literal listener treats it as uniform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiteralMeaningTable {
    words: usize,
    rows: Vec<Vec<f64>>,
    degenerate: Vec<bool>,
}

impl LiteralMeaningTable {
    pub fn new(words: usize, rows: Vec<Vec<f64>>) -> RsaResult<Self> {
        let mut clean = Vec::with_capacity(rows.len());
        let mut degenerate = Vec::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != words {
                return Err(RsaError::invalid_utterance(
                    format!("#{}", index),
                    format!("literal row has {} entries for {} words", row.len(), words),
                ));
            }
            let row: Vec<f64> = row
                .into_iter()
                .map(|s| if s.is_finite() && s > 0.0 { s } else { 0.0 })
                .collect();
            degenerate.push(row.iter().all(|&s| s == 0.0));
            clean.push(row);
        }

        Ok(Self {
            words,
            rows: clean,
            degenerate,
        })
    }

    pub fn utterances(&self) -> usize {
        self.rows.len()
    }

    pub fn words(&self) -> usize {
        self.words
    }

    pub fn row(&self, utterance: usize) -> Option<&[f64]> {
        self.rows.get(utterance).map(Vec::as_slice)
    }

    pub fn get(&self, utterance: usize, word: usize) -> Option<f64> {
        self.rows.get(utterance)?.get(word).copied()
    }

    pub fn is_degenerate(&self, utterance: usize) -> bool {
        self.degenerate.get(utterance).copied().unwrap_or(false)
    }

    /// Indices of degenerate rows, ascending.
    pub fn degenerate_rows(&self) -> Vec<usize> {
        self.degenerate
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| d.then_some(i))
            .collect()
    }
}
