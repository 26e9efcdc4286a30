//! Semantic Scorer: a caching front for the embedding oracle.
//!
//! Owns the meaning vectors for one solve. Vectors are fetched concurrently
//! under a round deadline and merged by text, so the order in which calls
//! complete never shows up in the result.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use connections_types::{Board, MeaningVector, Utterance};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::traits::EmbeddingOracle;

/// Outcome of one [`SemanticScorer::embed_all`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmbeddingBatch {
    /// Vectors for every requested text that is now available, cached or new.
    pub vectors: BTreeMap<String, MeaningVector>,
    /// Texts whose embedding failed or did not finish in time, sorted.
    pub missing: Vec<String>,
    /// Whether the deadline cut outstanding calls short.
    pub timed_out: bool,
}

impl EmbeddingBatch {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub struct SemanticScorer {
    oracle: Arc<dyn EmbeddingOracle>,
    cache: BTreeMap<String, MeaningVector>,
}

impl SemanticScorer {
    pub fn new(oracle: Arc<dyn EmbeddingOracle>) -> Self {
        Self {
            oracle,
            cache: BTreeMap::new(),
        }
    }

    pub fn cached(&self, text: &str) -> Option<&MeaningVector> {
        self.cache.get(text)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Embed every text not already cached, concurrently, until `deadline`.
    ///
    /// Failed calls are logged and reported in [`EmbeddingBatch::missing`];
    /// they are retried on the next call since only successes are cached.
    #[instrument(skip(self, texts), fields(oracle = %self.oracle.name()))]
    pub async fn embed_all<I, S>(&mut self, texts: I, deadline: Instant) -> EmbeddingBatch
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requested: BTreeSet<String> = texts.into_iter().map(Into::into).collect();
        let pending: Vec<String> = requested
            .iter()
            .filter(|t| !self.cache.contains_key(t.as_str()))
            .cloned()
            .collect();

        debug!(
            requested = requested.len(),
            pending = pending.len(),
            "Embedding texts"
        );

        let mut outstanding: BTreeSet<String> = pending.iter().cloned().collect();
        let mut calls = FuturesUnordered::new();
        for text in pending {
            let oracle = Arc::clone(&self.oracle);
            calls.push(async move {
                let result = oracle.embed(&text).await;
                (text, result)
            });
        }

        let mut fetched = Vec::new();
        let mut timed_out = false;
        while !calls.is_empty() {
            match tokio::time::timeout_at(deadline, calls.next()).await {
                Ok(Some((text, Ok(vector)))) => {
                    outstanding.remove(&text);
                    fetched.push((text, vector));
                }
                Ok(Some((text, Err(err)))) => {
                    warn!(text = %text, error = %err, "Embedding failed");
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    warn!(
                        outstanding = outstanding.len(),
                        "Embedding deadline reached; dropping outstanding calls"
                    );
                    break;
                }
            }
        }
        drop(calls);

        for (text, vector) in fetched {
            self.cache.insert(text, vector);
        }

        let mut batch = EmbeddingBatch {
            timed_out,
            ..Default::default()
        };
        for text in requested {
            match self.cache.get(&text) {
                Some(vector) => {
                    batch.vectors.insert(text, vector.clone());
                }
                None => batch.missing.push(text),
            }
        }
        batch
    }

    /// Similarity between two vectors as the oracle defines it.
    pub fn similarity(&self, a: &MeaningVector, b: &MeaningVector) -> f64 {
        self.oracle.similarity(a, b)
    }

    /// Meaning vector for an utterance.
    ///
    /// The description vector, blended with the centroid of the claimed
    /// words when `centroid_weight > 0`. `None` while any needed vector is
    /// still missing from the cache.
    pub fn utterance_vector(
        &self,
        utterance: &Utterance,
        board: &Board,
        centroid_weight: f64,
    ) -> Option<MeaningVector> {
        let description = self.cache.get(utterance.hypothesis.meaning_text())?;
        if centroid_weight <= 0.0 {
            return Some(description.clone());
        }

        let mut claimed = Vec::with_capacity(utterance.members.len());
        for &index in &utterance.members {
            claimed.push(self.cache.get(board.word(index)?.as_str())?);
        }
        match MeaningVector::centroid(claimed) {
            Some(centroid) => Some(description.blend(&centroid, centroid_weight)),
            None => Some(description.clone()),
        }
    }

    /// Literal similarity of an utterance to every board word, in board order.
    ///
    /// `None` while the utterance vector or any word vector is missing.
    pub fn literal_row(
        &self,
        utterance: &Utterance,
        board: &Board,
        centroid_weight: f64,
    ) -> Option<Vec<f64>> {
        let meaning = self.utterance_vector(utterance, board, centroid_weight)?;
        board
            .words()
            .iter()
            .map(|word| {
                self.cache
                    .get(word.as_str())
                    .map(|vector| self.similarity(&meaning, vector))
            })
            .collect()
    }
}

impl std::fmt::Debug for SemanticScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticScorer")
            .field("oracle", &self.oracle.name())
            .field("cached", &self.cache.len())
            .finish()
    }
}
