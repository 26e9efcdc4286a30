//! RSA Inference Engine.
//!
//! Given a board, a pool of utterances and their literal meaning table,
//! builds the belief ladder to the configured depth and scores every
//! utterance against the words it claims.

use connections_types::{Board, EngineConfig, RsaError, RsaResult, Utterance, UtteranceId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::belief::BeliefLadder;
use crate::literal::LiteralMeaningTable;
use crate::softmax::{to_probabilities, top_k};

/// Low-confidence events observed during one inference pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceDiagnostics {
    pub utterances: usize,
    pub words: usize,
    pub depth: u32,
    /// Pool indices whose literal row was all zero and fell back to uniform.
    pub degenerate_rows: Vec<usize>,
    /// Claimed words outside the listener's top group, across all utterances.
    pub penalised_claims: usize,
}

/// Belief tables and per-utterance scores for one pool.
///
/// Utterances are addressed by their index in the pool passed to
/// [`RsaEngine::infer`].
#[derive(Clone, Debug)]
pub struct InferenceResult {
    ids: Vec<UtteranceId>,
    ladder: BeliefLadder,
    scores: Vec<f64>,
    confidences: Vec<f64>,
    top: Vec<Vec<usize>>,
    diagnostics: InferenceDiagnostics,
}

impl InferenceResult {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[UtteranceId] {
        &self.ids
    }

    pub fn index_of(&self, id: &UtteranceId) -> Option<usize> {
        self.ids.iter().position(|candidate| candidate == id)
    }

    pub fn depth(&self) -> u32 {
        self.ladder.depth()
    }

    /// `L_0(word | utterance)`.
    pub fn literal_listener(&self, utterance: usize, word: usize) -> Option<f64> {
        self.ladder
            .listener(0, utterance)?
            .get(word)
            .map(|lp| lp.exp())
    }

    /// `S_depth(· | word)` over the pool, for `depth` in `1..=D`.
    pub fn pragmatic_speaker(&self, word: usize, depth: u32) -> Option<Vec<f64>> {
        self.ladder.speaker(depth, word).map(to_probabilities)
    }

    /// `L_depth(· | utterance)` over board words, for `depth` in `0..=D`.
    pub fn pragmatic_listener(&self, utterance: usize, depth: u32) -> Option<Vec<f64>> {
        self.ladder.listener(depth, utterance).map(to_probabilities)
    }

    /// Joint log-likelihood of the utterance's claimed words at the final depth.
    pub fn score(&self, utterance: usize) -> Option<f64> {
        self.scores.get(utterance).copied()
    }

    /// Final-listener probability mass on the claimed words, in `[0, 1]`.
    pub fn confidence(&self, utterance: usize) -> Option<f64> {
        self.confidences.get(utterance).copied()
    }

    /// The `group_size` most probable words under the final listener.
    pub fn top_words(&self, utterance: usize) -> Option<&[usize]> {
        self.top.get(utterance).map(Vec::as_slice)
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn confidences(&self) -> &[f64] {
        &self.confidences
    }

    pub fn diagnostics(&self) -> &InferenceDiagnostics {
        &self.diagnostics
    }
}

/// Recursive speaker/listener reasoning over a candidate pool.
#[derive(Clone, Debug, Default)]
pub struct RsaEngine {
    config: EngineConfig,
}

impl RsaEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full ladder over `utterances` and score each one.
    ///
    /// Fails with [`RsaError::EmptyCandidateSet`] for an empty pool and with
    /// [`RsaError::InvalidUtterance`] when an utterance's claimed subset has
    /// the wrong size or leaves the board.
    pub fn infer(
        &self,
        board: &Board,
        utterances: &[Utterance],
        literal: &LiteralMeaningTable,
    ) -> RsaResult<InferenceResult> {
        if utterances.is_empty() {
            return Err(RsaError::EmptyCandidateSet);
        }
        if literal.utterances() != utterances.len() || literal.words() != board.len() {
            return Err(RsaError::Configuration(format!(
                "literal table is {}x{}, expected {}x{}",
                literal.utterances(),
                literal.words(),
                utterances.len(),
                board.len()
            )));
        }
        for utterance in utterances {
            self.check(board, utterance)?;
        }

        let degenerate_rows = literal.degenerate_rows();
        for &row in &degenerate_rows {
            warn!(
                utterance = %utterances[row].id,
                label = %utterances[row].label(),
                "Literal row is all zero; using uniform listener"
            );
        }

        let ladder = BeliefLadder::build(
            literal,
            &self.config.rationality,
            self.config.reasoning_depth,
        );

        let floor = self.config.miss_penalty_floor.ln();
        let mut scores = Vec::with_capacity(utterances.len());
        let mut confidences = Vec::with_capacity(utterances.len());
        let mut top = Vec::with_capacity(utterances.len());
        let mut penalised_claims = 0;

        for (index, utterance) in utterances.iter().enumerate() {
            let listener = ladder.final_listener(index).ok_or_else(|| {
                RsaError::invalid_utterance(utterance.label(), "missing listener row")
            })?;
            let best = top_k(listener, self.config.group_size);

            let mut score = 0.0;
            let mut mass = 0.0;
            for &word in &utterance.members {
                let lp = listener[word];
                mass += lp.exp();
                if best.contains(&word) {
                    score += lp;
                } else {
                    score += lp.min(floor);
                    penalised_claims += 1;
                }
            }

            scores.push(score);
            confidences.push(mass.clamp(0.0, 1.0));
            top.push(best);
        }

        let diagnostics = InferenceDiagnostics {
            utterances: utterances.len(),
            words: board.len(),
            depth: ladder.depth(),
            degenerate_rows,
            penalised_claims,
        };

        debug!(
            utterances = diagnostics.utterances,
            depth = diagnostics.depth,
            degenerate = diagnostics.degenerate_rows.len(),
            penalised = diagnostics.penalised_claims,
            "Inference complete"
        );

        Ok(InferenceResult {
            ids: utterances.iter().map(|u| u.id).collect(),
            ladder,
            scores,
            confidences,
            top,
            diagnostics,
        })
    }

    fn check(&self, board: &Board, utterance: &Utterance) -> RsaResult<()> {
        if utterance.members.len() != self.config.group_size {
            return Err(RsaError::invalid_utterance(
                utterance.label(),
                format!(
                    "claims {} words, group size is {}",
                    utterance.members.len(),
                    self.config.group_size
                ),
            ));
        }
        if let Some(&outside) = utterance.members.iter().find(|&&i| i >= board.len()) {
            return Err(RsaError::invalid_utterance(
                utterance.label(),
                format!("word index {} is outside the board", outside),
            ));
        }
        if utterance.members.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(RsaError::invalid_utterance(
                utterance.label(),
                "claimed words repeat",
            ));
        }
        Ok(())
    }
}
