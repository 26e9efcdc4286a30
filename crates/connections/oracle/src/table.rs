//! Embedding oracle over an explicit lookup table.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use connections_types::{normalize, MeaningVector};

use crate::error::{OracleError, OracleResult};
use crate::traits::EmbeddingOracle;

/// Embedding oracle backed by an explicit text → vector table.
///
/// Lookups are normalised the same way board words are, so `"pets"` and
/// `"PETS"` share an entry. Unknown text fails with
/// [`OracleError::UnknownText`].
///
/// Texts registered with [`TableEmbeddingOracle::cold`] answer their first
/// lookup only after a delay, like a remote model warming its cache.
#[derive(Debug, Default)]
pub struct TableEmbeddingOracle {
    entries: HashMap<String, MeaningVector>,
    cold: Mutex<HashMap<String, Duration>>,
}

impl TableEmbeddingOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.insert(text, vector);
        self
    }

    /// Delay the first lookup of `text` by `latency`.
    pub fn cold(self, text: &str, latency: Duration) -> Self {
        self.cold
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize(text), latency);
        self
    }

    pub fn insert(&mut self, text: &str, vector: Vec<f32>) {
        self.entries.insert(normalize(text), MeaningVector::new(vector));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl EmbeddingOracle for TableEmbeddingOracle {
    async fn embed(&self, text: &str) -> OracleResult<MeaningVector> {
        let key = normalize(text);
        let latency = self
            .cold
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.entries
            .get(&key)
            .cloned()
            .ok_or_else(|| OracleError::UnknownText(text.to_string()))
    }

    fn name(&self) -> &str {
        "table"
    }
}
