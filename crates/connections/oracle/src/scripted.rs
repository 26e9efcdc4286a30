//! Round-keyed scripted hypothesis oracle.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use connections_types::CategoryHypothesis;
use tracing::debug;

use crate::error::{OracleError, OracleResult};
use crate::traits::{HypothesisOracle, ProposalRequest};

/// What the scripted oracle does for one solver round.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRound {
    pub hypotheses: Vec<CategoryHypothesis>,
    pub latency: Option<Duration>,
    pub failure: Option<String>,
}

/// Hypothesis oracle that replays a fixed script, keyed by solver round.
///
/// Every request in a round sees the same scripted hypotheses, filtered the
/// way a well-behaved oracle would answer: only hypotheses whose words were
/// all requested, none on the exclusion list, at most `max_proposals`.
/// Keying by round rather than by call makes answers independent of the
/// order in which concurrent requests arrive.
#[derive(Debug, Default)]
pub struct ScriptedHypothesisOracle {
    rounds: BTreeMap<u32, ScriptedRound>,
    fallback: ScriptedRound,
    requests: Mutex<Vec<ProposalRequest>>,
}

impl ScriptedHypothesisOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests in `round` with `hypotheses`.
    pub fn respond(mut self, round: u32, hypotheses: Vec<CategoryHypothesis>) -> Self {
        self.rounds.entry(round).or_default().hypotheses = hypotheses;
        self
    }

    /// Delay every answer in `round`.
    pub fn delay(mut self, round: u32, latency: Duration) -> Self {
        self.rounds.entry(round).or_default().latency = Some(latency);
        self
    }

    /// Fail every request in `round` with a transport error.
    pub fn fail(mut self, round: u32, reason: impl Into<String>) -> Self {
        self.rounds.entry(round).or_default().failure = Some(reason.into());
        self
    }

    /// Answer for rounds without their own script.
    pub fn otherwise(mut self, hypotheses: Vec<CategoryHypothesis>) -> Self {
        self.fallback.hypotheses = hypotheses;
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<ProposalRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn script_for(&self, round: u32) -> &ScriptedRound {
        self.rounds.get(&round).unwrap_or(&self.fallback)
    }
}

#[async_trait]
impl HypothesisOracle for ScriptedHypothesisOracle {
    async fn propose(&self, request: &ProposalRequest) -> OracleResult<Vec<CategoryHypothesis>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let script = self.script_for(request.round);
        if let Some(latency) = script.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(reason) = &script.failure {
            return Err(OracleError::Transport(reason.clone()));
        }

        let answer: Vec<CategoryHypothesis> = script
            .hypotheses
            .iter()
            .filter(|h| request.covers(h) && !request.excludes(&h.id()))
            .take(request.max_proposals)
            .cloned()
            .collect();

        debug!(
            round = request.round,
            requested_words = request.words.len(),
            answered = answer.len(),
            "Scripted proposals"
        );
        Ok(answer)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
