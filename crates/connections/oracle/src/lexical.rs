//! Offline embeddings from hashed character n-grams.

use async_trait::async_trait;
use connections_types::{normalize, MeaningVector};

use crate::error::OracleResult;
use crate::traits::EmbeddingOracle;

/// Default vector dimension for [`LexicalEmbeddingOracle`].
pub const DEFAULT_LEXICAL_DIM: usize = 64;

/// Deterministic, offline embedding built from hashed character n-grams.
///
/// Each n-gram of the normalised, space-padded text and each whole token is
/// hashed with BLAKE3 into a signed bucket. Texts sharing spelling share
/// buckets; nothing more semantic than that is claimed.
#[derive(Clone, Debug)]
pub struct LexicalEmbeddingOracle {
    dim: usize,
    ngram: usize,
}

impl Default for LexicalEmbeddingOracle {
    fn default() -> Self {
        Self::new(DEFAULT_LEXICAL_DIM)
    }
}

impl LexicalEmbeddingOracle {
    pub fn new(dim: usize) -> Self {
        Self {
            dim: dim.max(1),
            ngram: 3,
        }
    }

    pub fn with_ngram(mut self, ngram: usize) -> Self {
        self.ngram = ngram.max(1);
        self
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Synchronous embedding; [`EmbeddingOracle::embed`] wraps this.
    pub fn vectorize(&self, text: &str) -> MeaningVector {
        let mut values = vec![0.0_f32; self.dim];
        let normalized = normalize(text);
        if normalized.is_empty() {
            return MeaningVector::new(values);
        }

        let padded: Vec<char> = format!(" {} ", normalized).chars().collect();
        let grams = padded
            .windows(self.ngram.min(padded.len()))
            .map(|w| w.iter().collect::<String>());
        let tokens = normalized.split(' ').map(|t| format!("#{}", t));

        for feature in grams.chain(tokens) {
            let digest = blake3::hash(feature.as_bytes());
            let bytes = digest.as_bytes();
            let mut head = [0u8; 8];
            head.copy_from_slice(&bytes[..8]);
            let bucket = (u64::from_le_bytes(head) % self.dim as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            values[bucket] += sign;
        }
        MeaningVector::new(values)
    }
}

#[async_trait]
impl EmbeddingOracle for LexicalEmbeddingOracle {
    async fn embed(&self, text: &str) -> OracleResult<MeaningVector> {
        Ok(self.vectorize(text))
    }

    fn name(&self) -> &str {
        "lexical"
    }
}
