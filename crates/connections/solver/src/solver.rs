//! The solver loop.
//!
//! ```text
//!   GENERATING ──► SCORING ──► SEARCHING ──┬──► ACCEPTED ──► DONE
//!        ▲                                 │
//!        └────────────── REFINING ◄────────┴──► FAILED (last round,
//!                                                      or unrecoverable)
//! ```
//!
//! Each round shares one deadline between the hypothesis fan-out and the
//! embedding fan-out. Results are merged by utterance id, so the order in
//! which oracle calls complete never changes the outcome.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use connections_oracle::{EmbeddingOracle, HypothesisOracle, ProposalRequest, SemanticScorer};
use connections_rsa::{InferenceResult, LiteralMeaningTable, RsaEngine};
use connections_search::{PartitionSearch, SearchCandidate, SearchError, Selection};
use connections_types::{
    Board, CategoryHypothesis, FailureReport, Group, Partition, RoundOutcome, RoundReport,
    RsaError, RsaResult, Solution, SolverConfig, SolverPhase, Utterance, UtteranceId, Word,
};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::pool::{Offer, UtterancePool};

/// Iterative RSA solver over a hypothesis oracle and an embedding oracle.
pub struct RsaSolver {
    hypotheses: Arc<dyn HypothesisOracle>,
    embeddings: Arc<dyn EmbeddingOracle>,
    config: SolverConfig,
}

impl RsaSolver {
    /// Build a solver; fails when `config` does not validate.
    pub fn new(
        hypotheses: Arc<dyn HypothesisOracle>,
        embeddings: Arc<dyn EmbeddingOracle>,
        config: SolverConfig,
    ) -> RsaResult<Self> {
        config.validate()?;
        Ok(Self {
            hypotheses,
            embeddings,
            config,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve a board.
    ///
    /// Returns the accepted partition, or a [`FailureReport`] carrying the
    /// best partial partition once the round budget is spent.
    #[instrument(skip(self, board), fields(words = board.len(), groups = board.groups()))]
    pub async fn solve(&self, board: &Board) -> Result<Solution, FailureReport> {
        self.solve_rejecting(board, &[]).await
    }

    /// Solve while refusing the word sets claimed by `rejected`, and asking
    /// the hypothesis oracle not to propose them again.
    pub async fn solve_rejecting(
        &self,
        board: &Board,
        rejected: &[CategoryHypothesis],
    ) -> Result<Solution, FailureReport> {
        let config = self.config.with_shape(board.group_size(), board.groups());
        let mut run = Run {
            board,
            config,
            scorer: SemanticScorer::new(Arc::clone(&self.embeddings)),
            pool: UtterancePool::barring(rejected),
            rejected,
            phases: Vec::new(),
            reports: Vec::new(),
            best_partial: Partition::empty(),
            last: None,
        };

        let max_rounds = run.config.max_rounds;
        let mut cause = RsaError::RoundBudgetExhausted { rounds: max_rounds };
        for round in 1..=max_rounds {
            match self.round(&mut run, round).await {
                RoundEnd::Accepted(partition) => {
                    run.enter(SolverPhase::Accepted);
                    run.enter(SolverPhase::Done);
                    return Ok(run.solution(partition, round));
                }
                RoundEnd::Refine if round < max_rounds => run.enter(SolverPhase::Refining),
                RoundEnd::Refine => {}
                RoundEnd::Abort(err) => {
                    cause = err;
                    break;
                }
            }
        }

        run.enter(SolverPhase::Failed);
        let failure = run.failure(cause);
        info!(
            rounds = failure.rounds,
            covered = failure.best_partial.covered_count(),
            cause = %failure.cause,
            "Solve failed"
        );
        Err(failure)
    }

    /// One generate, score and search cycle.
    async fn round(&self, run: &mut Run<'_>, round: u32) -> RoundEnd {
        let board = run.board;
        let deadline = Instant::now() + run.config.round_timeout();

        run.enter(SolverPhase::Generating);
        let requests = run.requests(round);
        let generated = self.generate(&requests, deadline).await;

        let mut report = RoundReport {
            round,
            requests: requests.len(),
            proposals: generated.hypotheses.len(),
            new_utterances: 0,
            invalid: 0,
            off_board: Vec::new(),
            unscored: 0,
            pool_size: 0,
            degenerate_rows: 0,
            timed_out: generated.timed_out,
            outcome: RoundOutcome::EmptyCandidateSet,
        };

        let mut off_board = BTreeSet::new();
        for hypothesis in generated.hypotheses {
            off_board.extend(hypothesis.words.iter().filter(|w| !board.contains(w)).cloned());
            match Utterance::resolve(board, hypothesis) {
                Ok(utterance) => {
                    if run.pool.offer(utterance, board) == Offer::Barred {
                        debug!(round, "Skipping previously rejected word set");
                    }
                }
                Err(err) => {
                    warn!(round, error = %err, "Dropping invalid hypothesis");
                    report.invalid += 1;
                }
            }
        }

        report.off_board = off_board.into_iter().collect();

        run.enter(SolverPhase::Scoring);
        let mut texts: Vec<String> = board.words().iter().map(|w| w.as_str().to_string()).collect();
        texts.extend(run.pool.pending_texts());
        let batch = run.scorer.embed_all(texts, deadline).await;
        let timeout = match (generated.timed_out, batch.timed_out) {
            (true, _) => Some(RsaError::ExternalOracleTimeout {
                phase: SolverPhase::Generating,
            }),
            (false, true) => Some(RsaError::ExternalOracleTimeout {
                phase: SolverPhase::Scoring,
            }),
            (false, false) => None,
        };
        report.timed_out = timeout.is_some();

        let scorer = &run.scorer;
        let weight = run.config.centroid_weight;
        report.new_utterances = run
            .pool
            .promote(|utterance| scorer.literal_row(utterance, board, weight));
        report.unscored = run.pool.pending_len();
        report.pool_size = run.pool.len();
        if report.unscored > 0 {
            debug!(round, unscored = report.unscored, "Utterances waiting for embeddings");
        }

        run.enter(SolverPhase::Searching);
        let evaluation = evaluate(board, &run.config, &run.pool);
        report.degenerate_rows = evaluation.degenerate_rows;
        let accepted = matches!(evaluation.outcome, RoundOutcome::Accepted { .. });
        report.outcome = match timeout {
            Some(err) if !accepted => {
                warn!(round, error = %err, "Keeping results that arrived before the deadline");
                RoundOutcome::recovered(&err).unwrap_or(evaluation.outcome)
            }
            _ => evaluation.outcome,
        };

        info!(
            round,
            pool = report.pool_size,
            proposals = report.proposals,
            invalid = report.invalid,
            timed_out = report.timed_out,
            outcome = ?report.outcome,
            "Round finished"
        );
        run.reports.push(report);

        if let Some(err) = evaluation.fatal {
            return RoundEnd::Abort(err);
        }
        match evaluation.partition {
            Some(partition) if accepted => RoundEnd::Accepted(partition),
            Some(partition) => {
                if partition.better_partial_than(&run.best_partial) {
                    run.best_partial = partition.clone();
                }
                run.last = Some(partition);
                RoundEnd::Refine
            }
            None => {
                run.last = None;
                RoundEnd::Refine
            }
        }
    }

    /// Fan the requests out to the hypothesis oracle until `deadline`.
    ///
    /// Failed requests count as empty answers. Answers are concatenated in
    /// request order, not completion order.
    async fn generate(&self, requests: &[ProposalRequest], deadline: Instant) -> Generated {
        let mut calls = FuturesUnordered::new();
        for (index, request) in requests.iter().enumerate() {
            let oracle = &self.hypotheses;
            calls.push(async move { (index, oracle.propose(request).await) });
        }

        let mut answers: Vec<Vec<CategoryHypothesis>> = vec![Vec::new(); requests.len()];
        let mut timed_out = false;
        while !calls.is_empty() {
            match tokio::time::timeout_at(deadline, calls.next()).await {
                Ok(Some((index, Ok(hypotheses)))) => answers[index] = hypotheses,
                Ok(Some((index, Err(err)))) => {
                    warn!(
                        request = index,
                        oracle = %self.hypotheses.name(),
                        error = %err,
                        "Hypothesis request failed"
                    );
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    warn!(
                        outstanding = calls.len(),
                        "Round deadline reached; dropping outstanding hypothesis requests"
                    );
                    break;
                }
            }
        }

        Generated {
            hypotheses: answers.into_iter().flatten().collect(),
            timed_out,
        }
    }
}

impl std::fmt::Debug for RsaSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSolver")
            .field("hypotheses", &self.hypotheses.name())
            .field("embeddings", &self.embeddings.name())
            .field("config", &self.config)
            .finish()
    }
}

struct Generated {
    hypotheses: Vec<CategoryHypothesis>,
    timed_out: bool,
}

/// How a round hands control back to the loop.
enum RoundEnd {
    Accepted(Partition),
    Refine,
    /// The error will recur every round; stop refining.
    Abort(RsaError),
}

/// State carried across the rounds of one solve.
struct Run<'a> {
    board: &'a Board,
    config: SolverConfig,
    scorer: SemanticScorer,
    pool: UtterancePool,
    rejected: &'a [CategoryHypothesis],
    phases: Vec<SolverPhase>,
    reports: Vec<RoundReport>,
    best_partial: Partition,
    /// Partition from the previous round, if the search produced one.
    last: Option<Partition>,
}

impl Run<'_> {
    fn enter(&mut self, phase: SolverPhase) {
        debug!(phase = %phase, round = self.reports.len() + 1, "Solver phase");
        self.phases.push(phase);
    }

    /// Requests for this round: the target words first, then the whole
    /// board, with identical word lists collapsed.
    fn requests(&self, round: u32) -> Vec<ProposalRequest> {
        let all = self.board.words().to_vec();
        let mut word_sets = Vec::with_capacity(2);
        if round > 1 {
            if let Some(targets) = self.targets() {
                if targets != all {
                    word_sets.push(targets);
                }
            }
        }
        word_sets.push(all);

        let exclude = self.exclusions();
        word_sets
            .into_iter()
            .map(|words| {
                ProposalRequest::new(round, words, self.config.max_proposals)
                    .with_exclude(exclude.clone())
            })
            .collect()
    }

    /// Words the next round should concentrate on.
    ///
    /// Uncovered words after an incomplete partition; words of the groups
    /// under the floor after a complete but weak one.
    fn targets(&self) -> Option<Vec<Word>> {
        let last = self.last.as_ref()?;
        let words = if last.complete {
            let weak: BTreeSet<usize> = last
                .groups
                .iter()
                .filter(|g| g.confidence < self.config.confidence_floor)
                .flat_map(|g| g.members.iter().copied())
                .collect();
            self.board.words_at(&weak.into_iter().collect::<Vec<_>>())
        } else {
            last.uncovered_words(self.board)
        };
        (!words.is_empty()).then_some(words)
    }

    /// Hypotheses already tried and not part of the last partition, plus
    /// those rejected by the caller. Ordered by id.
    fn exclusions(&self) -> Vec<CategoryHypothesis> {
        let keep: BTreeSet<UtteranceId> = self
            .last
            .iter()
            .flat_map(|p| p.groups.iter().map(|g| g.utterance))
            .collect();
        let mut excluded: BTreeMap<UtteranceId, CategoryHypothesis> = self
            .pool
            .hypotheses_except(&keep)
            .into_iter()
            .map(|h| (h.id(), h))
            .collect();
        for hypothesis in self.rejected {
            excluded.insert(hypothesis.id(), hypothesis.clone());
        }
        excluded.into_values().collect()
    }

    fn solution(self, mut partition: Partition, round: u32) -> Solution {
        partition.sort_by_confidence();
        let confidence = partition.confidence();
        Solution {
            groups: partition.groups,
            confidence,
            total_score: partition.total_score,
            rounds_used: round,
            phases: self.phases,
            rounds: self.reports,
        }
    }

    fn failure(&mut self, cause: RsaError) -> FailureReport {
        let mut best_partial = std::mem::take(&mut self.best_partial);
        best_partial.sort_by_confidence();
        FailureReport {
            cause,
            rounds: self.reports.len() as u32,
            board_size: self.board.len(),
            uncovered: best_partial.uncovered_words(self.board),
            best_partial,
            phases: std::mem::take(&mut self.phases),
            reports: std::mem::take(&mut self.reports),
        }
    }
}

/// What the searching phase produced.
struct Evaluation {
    partition: Option<Partition>,
    outcome: RoundOutcome,
    degenerate_rows: usize,
    /// Unrecoverable error that ends the solve.
    fatal: Option<RsaError>,
}

impl Evaluation {
    fn failed(err: RsaError, board: &Board) -> Self {
        let uncovered = RoundOutcome::NoCompletePartition {
            uncovered: board.len(),
        };
        let (outcome, fatal) = if err.is_recoverable() {
            let outcome = RoundOutcome::recovered(&err).unwrap_or_else(|| {
                warn!(error = %err, "Inference failed; treating round as uncovered");
                uncovered
            });
            (outcome, None)
        } else {
            error!(error = %err, "Unrecoverable inference error; stopping");
            (uncovered, Some(err))
        };
        Self {
            partition: None,
            outcome,
            degenerate_rows: 0,
            fatal,
        }
    }
}

/// Run the engine over the scored pool and search for a partition.
fn evaluate(board: &Board, config: &SolverConfig, pool: &UtterancePool) -> Evaluation {
    let (utterances, rows) = pool.snapshot();
    let table = match LiteralMeaningTable::new(board.len(), rows) {
        Ok(table) => table,
        Err(err) => return Evaluation::failed(err, board),
    };
    let inference = match RsaEngine::new(config.engine()).infer(board, &utterances, &table) {
        Ok(inference) => inference,
        Err(err) => return Evaluation::failed(err, board),
    };
    let degenerate_rows = inference.diagnostics().degenerate_rows.len();

    let candidates: Vec<SearchCandidate> = utterances
        .iter()
        .zip(inference.scores())
        .map(|(u, &score)| SearchCandidate::new(u.members.clone(), score))
        .collect();

    let (partition, outcome) = match PartitionSearch::new(config.search()).search(board.len(), &candidates) {
        Ok(found) => {
            let partition = assemble(board, &utterances, &inference, &found.best);
            let confidence = partition.confidence();
            let outcome = if confidence >= config.confidence_floor {
                RoundOutcome::Accepted { confidence }
            } else {
                RoundOutcome::BelowConfidenceFloor { confidence }
            };
            (partition, outcome)
        }
        Err(SearchError::NoCompletePartition { partial, uncovered }) => (
            assemble(board, &utterances, &inference, &partial),
            RoundOutcome::NoCompletePartition { uncovered },
        ),
        Err(err) => return Evaluation::failed(err.into(), board),
    };

    Evaluation {
        partition: Some(partition),
        outcome,
        degenerate_rows,
        fatal: None,
    }
}

/// Turn a search selection back into groups over the board.
fn assemble(
    board: &Board,
    utterances: &[Utterance],
    inference: &InferenceResult,
    selection: &Selection,
) -> Partition {
    let groups = selection
        .candidates
        .iter()
        .filter_map(|&index| {
            let utterance = utterances.get(index)?;
            Some(Group {
                utterance: utterance.id,
                label: utterance.label().to_string(),
                words: board.words_at(&utterance.members),
                members: utterance.members.clone(),
                score: inference.score(index)?,
                confidence: inference.confidence(index)?,
            })
        })
        .collect();
    Partition::from_groups(board, groups)
}
