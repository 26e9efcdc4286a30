//! Category hypotheses, their content-derived identifiers, and the
//! board-resolved utterances the engine reasons about.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{normalize, Board, Word};
use crate::error::{RsaError, RsaResult};

// ── Meaning Vector ──────────────────────────────────────────────────────

/// Fixed-dimension meaning representation produced by an embedding oracle.
///
/// The engine only reads vectors; it never mutates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeaningVector(Vec<f32>);

impl MeaningVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|&x| f64::from(x) * f64::from(x))
            .sum::<f64>()
            .sqrt()
    }

    /// Unit-length copy, or `None` for a zero or non-finite vector.
    pub fn unit(&self) -> Option<MeaningVector> {
        let norm = self.norm();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        Some(Self(
            self.0.iter().map(|&x| (f64::from(x) / norm) as f32).collect(),
        ))
    }

    /// Cosine similarity in `[-1, 1]`, or `None` when undefined.
    pub fn cosine(&self, other: &MeaningVector) -> Option<f64> {
        if self.0.len() != other.0.len() || self.0.is_empty() {
            return None;
        }

        let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
        for (&x, &y) in self.0.iter().zip(other.0.iter()) {
            let (x, y) = (f64::from(x), f64::from(y));
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return None;
        }
        let cos = dot / (norm_a.sqrt() * norm_b.sqrt());
        cos.is_finite().then(|| cos.clamp(-1.0, 1.0))
    }

    /// Normalised centroid of a set of vectors of equal dimension.
    pub fn centroid<'a, I>(vectors: I) -> Option<MeaningVector>
    where
        I: IntoIterator<Item = &'a MeaningVector>,
    {
        let mut sum: Vec<f64> = Vec::new();
        let mut count = 0usize;
        for vector in vectors {
            let unit = vector.unit()?;
            if sum.is_empty() {
                sum = vec![0.0; unit.dim()];
            } else if sum.len() != unit.dim() {
                return None;
            }
            for (acc, &x) in sum.iter_mut().zip(unit.as_slice()) {
                *acc += f64::from(x);
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        MeaningVector(sum.into_iter().map(|x| (x / count as f64) as f32).collect()).unit()
    }

    /// `(1 - weight) * unit(self) + weight * unit(other)`.
    ///
    /// Falls back to `self` when the vectors cannot be combined.
    pub fn blend(&self, other: &MeaningVector, weight: f64) -> MeaningVector {
        let weight = weight.clamp(0.0, 1.0);
        match (self.unit(), other.unit()) {
            (Some(a), Some(b)) if a.dim() == b.dim() => MeaningVector(
                a.as_slice()
                    .iter()
                    .zip(b.as_slice())
                    .map(|(&x, &y)| ((1.0 - weight) * f64::from(x) + weight * f64::from(y)) as f32)
                    .collect(),
            ),
            _ => self.clone(),
        }
    }
}

// ── Category Hypothesis ─────────────────────────────────────────────────

/// A proposed category label plus the words it is claimed to explain.
///
/// Produced by the hypothesis oracle; the core treats it as an opaque
/// candidate identified by [`UtteranceId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryHypothesis {
    /// Short category label, e.g. "NBA TEAMS".
    pub label: String,
    /// Optional longer description used for embedding instead of the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Words the category is claimed to cover.
    pub words: Vec<Word>,
}

impl CategoryHypothesis {
    pub fn new<I, W>(label: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Word>,
    {
        Self {
            label: label.into(),
            description: None,
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Text sent to the embedding oracle for this hypothesis.
    pub fn meaning_text(&self) -> &str {
        match &self.description {
            Some(description) if !description.trim().is_empty() => description,
            _ => &self.label,
        }
    }

    /// Content-derived identifier.
    pub fn id(&self) -> UtteranceId {
        UtteranceId::derive(&self.label, &self.words)
    }
}

// ── Utterance Identifier ────────────────────────────────────────────────

/// BLAKE3 digest of the normalised label and the sorted claimed words.
///
/// Two proposals with the same label and word set share an id, which is what
/// the solver deduplicates and orders by.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtteranceId(pub [u8; 32]);

impl UtteranceId {
    pub fn derive(label: &str, words: &[Word]) -> Self {
        let mut sorted: Vec<&str> = words.iter().map(Word::as_str).collect();
        sorted.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        hasher.update(normalize(label).as_bytes());
        for word in sorted {
            hasher.update(&[0x1f]);
            hasher.update(word.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(hex.get(i * 2..i * 2 + 2)?, 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Debug for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UtteranceId({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..12])
    }
}

impl Serialize for UtteranceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for UtteranceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        UtteranceId::from_hex(&hex)
            .ok_or_else(|| serde::de::Error::custom("invalid utterance id hex"))
    }
}

// ── Utterance ───────────────────────────────────────────────────────────

/// A hypothesis viewed as a speaker move, resolved against a board.
///
/// `members` are sorted board indices of the claimed words.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: UtteranceId,
    pub hypothesis: CategoryHypothesis,
    pub members: Vec<usize>,
}

impl Utterance {
    /// Resolve a hypothesis against the board.
    ///
    /// Fails with [`RsaError::InvalidUtterance`] when the claimed subset has
    /// the wrong size, repeats a word, or names a word not on the board.
    pub fn resolve(board: &Board, hypothesis: CategoryHypothesis) -> RsaResult<Self> {
        if hypothesis.label.trim().is_empty() {
            return Err(RsaError::invalid_utterance(
                &hypothesis.label,
                "empty category label",
            ));
        }
        if hypothesis.words.len() != board.group_size() {
            return Err(RsaError::invalid_utterance(
                &hypothesis.label,
                format!(
                    "expected {} words, got {}",
                    board.group_size(),
                    hypothesis.words.len()
                ),
            ));
        }

        let mut members = Vec::with_capacity(hypothesis.words.len());
        for word in &hypothesis.words {
            let index = board.index_of(word).ok_or_else(|| {
                RsaError::invalid_utterance(&hypothesis.label, format!("{} is not on the board", word))
            })?;
            members.push(index);
        }
        members.sort_unstable();
        if members.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(RsaError::invalid_utterance(
                &hypothesis.label,
                "claimed words repeat",
            ));
        }

        Ok(Self {
            id: hypothesis.id(),
            hypothesis,
            members,
        })
    }

    pub fn label(&self) -> &str {
        &self.hypothesis.label
    }

    /// Whether the utterance claims the word at `index`.
    pub fn claims(&self, index: usize) -> bool {
        self.members.binary_search(&index).is_ok()
    }

    /// Whether two utterances claim at least one common word.
    pub fn conflicts_with(&self, other: &Utterance) -> bool {
        self.members.iter().any(|&i| other.claims(i))
    }
}
