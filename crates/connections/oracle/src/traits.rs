//! Interfaces to the two external collaborators the solver consumes.

use async_trait::async_trait;
use connections_types::{CategoryHypothesis, MeaningVector, UtteranceId, Word};
use serde::{Deserialize, Serialize};

use crate::error::OracleResult;

/// Turns words and phrases into meaning vectors.
///
/// Implementations must be deterministic for identical text within one
/// solve; nothing is assumed across runs.
#[async_trait]
pub trait EmbeddingOracle: Send + Sync {
    /// Embed a word, label or description.
    async fn embed(&self, text: &str) -> OracleResult<MeaningVector>;

    /// Similarity in `[0, 1]`.
    ///
    /// Defaults to cosine similarity rescaled from `[-1, 1]`; undefined
    /// similarity (empty, zero or mismatched vectors) is `0.0`.
    fn similarity(&self, a: &MeaningVector, b: &MeaningVector) -> f64 {
        a.cosine(b).map(|cos| (cos + 1.0) / 2.0).unwrap_or(0.0)
    }

    /// Short backend name for logs.
    fn name(&self) -> &str {
        "embedding"
    }
}

/// One call to the category hypothesis oracle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalRequest {
    /// One-based solver round issuing the request.
    pub round: u32,
    /// Words the proposals should explain.
    pub words: Vec<Word>,
    /// Hypotheses already tried and rejected; do not propose these again.
    pub exclude: Vec<CategoryHypothesis>,
    /// Upper bound on the number of hypotheses returned.
    pub max_proposals: usize,
}

impl ProposalRequest {
    pub fn new(round: u32, words: Vec<Word>, max_proposals: usize) -> Self {
        Self {
            round,
            words,
            exclude: Vec::new(),
            max_proposals,
        }
    }

    pub fn with_exclude(mut self, exclude: Vec<CategoryHypothesis>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Whether a hypothesis is on the exclusion list.
    pub fn excludes(&self, id: &UtteranceId) -> bool {
        self.exclude.iter().any(|h| h.id() == *id)
    }

    /// Whether every word the hypothesis claims was part of the request.
    pub fn covers(&self, hypothesis: &CategoryHypothesis) -> bool {
        hypothesis.words.iter().all(|w| self.words.contains(w))
    }
}

/// Proposes category hypotheses for a set of words.
///
/// May return fewer than `max_proposals`, and may fail transiently; the
/// solver treats a failure as an empty answer.
#[async_trait]
pub trait HypothesisOracle: Send + Sync {
    async fn propose(&self, request: &ProposalRequest) -> OracleResult<Vec<CategoryHypothesis>>;

    /// Short backend name for logs.
    fn name(&self) -> &str {
        "hypothesis"
    }
}
