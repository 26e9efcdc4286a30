//! Depth-first branch-and-bound over the conflict graph.
//!
//! At each node the uncovered word with the fewest available candidates is
//! branched on, candidates in descending score. A node is cut when some
//! uncovered word has no available candidate left, or when its partial score
//! plus the best per-word share of every uncovered word cannot reach the best
//! complete cover found so far.
//!
//! When no complete cover exists a second pass packs as many disjoint
//! candidates as possible, preferring higher total score among packings of
//! equal size, so the caller still gets the best partial partition.

use connections_types::{SearchConfig, MAX_BOARD_WORDS};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SearchError, SearchResult};
use crate::graph::{ConflictGraph, SearchCandidate};

/// Scores closer than this are treated as equal.
pub const SCORE_EPSILON: f64 = 1e-9;

/// A set of mutually disjoint candidates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Indices into the candidate slice passed to the search, ascending.
    pub candidates: Vec<usize>,
    pub total_score: f64,
    /// Weakest selected candidate; `None` for an empty selection.
    pub min_score: Option<f64>,
    /// Words covered.
    pub covered: usize,
    pub complete: bool,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Ordering between complete covers: higher total, then higher weakest
    /// group, then the lexicographically smaller candidate list.
    pub fn outranks(&self, other: &Selection) -> bool {
        if (self.total_score - other.total_score).abs() > SCORE_EPSILON {
            return self.total_score > other.total_score;
        }
        let mine = self.min_score.unwrap_or(f64::NEG_INFINITY);
        let theirs = other.min_score.unwrap_or(f64::NEG_INFINITY);
        if (mine - theirs).abs() > SCORE_EPSILON {
            return mine > theirs;
        }
        self.candidates < other.candidates
    }
}

/// Result of a search that found at least one complete cover.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub best: Selection,
    /// Nodes expanded.
    pub nodes: u64,
    /// Whether the node limit stopped the search early.
    pub truncated: bool,
}

/// Maximum-weight exact cover over scored candidate groups.
#[derive(Clone, Debug, Default)]
pub struct PartitionSearch {
    config: SearchConfig,
}

impl PartitionSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Select disjoint candidates covering all `words` board positions with
    /// the highest total score.
    ///
    /// Candidates of the wrong size, with repeated or out-of-range members,
    /// or with a non-finite score are ignored.
    pub fn search(&self, words: usize, candidates: &[SearchCandidate]) -> SearchResult<SearchOutcome> {
        if words > MAX_BOARD_WORDS {
            return Err(SearchError::TooLarge { words });
        }

        let mut ids = Vec::new();
        let mut masks = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.members.len() != self.config.group_size || !candidate.score.is_finite() {
                continue;
            }
            if let Some(mask) = candidate.mask(words) {
                ids.push(index);
                masks.push(mask);
            }
        }
        if ids.len() < candidates.len() {
            debug!(
                ignored = candidates.len() - ids.len(),
                "Ignoring malformed search candidates"
            );
        }

        let graph = ConflictGraph::build(masks);
        let scores: Vec<f64> = ids.iter().map(|&i| candidates[i].score).collect();
        let mut explorer = Explorer::new(&graph, &ids, &scores, words, &self.config);
        explorer.visit();
        if explorer.best.is_none() {
            explorer.nodes_in_pass = 0;
            explorer.stopped = false;
            explorer.pack(0);
        }

        debug!(
            candidates = graph.len(),
            conflicts = graph.edge_count(),
            nodes = explorer.nodes,
            complete = explorer.best.is_some(),
            "Partition search finished"
        );
        if explorer.truncated {
            warn!(
                limit = self.config.node_limit,
                "Partition search hit its node limit; returning best found so far"
            );
        }

        match explorer.best {
            Some(best) => Ok(SearchOutcome {
                best,
                nodes: explorer.nodes,
                truncated: explorer.truncated,
            }),
            None => {
                let partial = explorer.best_partial;
                Err(SearchError::NoCompletePartition {
                    uncovered: words - partial.covered,
                    partial,
                })
            }
        }
    }
}

/// Mutable search state; graph indices throughout, mapped back to caller
/// indices only when a selection is recorded.
struct Explorer<'a> {
    graph: &'a ConflictGraph,
    ids: &'a [usize],
    scores: &'a [f64],
    group_size: usize,
    words: usize,
    full: u128,
    /// Per word, the candidates containing it, best score first.
    by_word: Vec<Vec<usize>>,
    /// Selected candidates that overlap each candidate; zero means available.
    blocked: Vec<u32>,
    chosen: Vec<usize>,
    covered: u128,
    partial_score: f64,
    best: Option<Selection>,
    best_partial: Selection,
    nodes: u64,
    nodes_in_pass: u64,
    limit: u64,
    /// The current pass ran out of nodes.
    stopped: bool,
    /// Some pass ran out of nodes.
    truncated: bool,
}

impl<'a> Explorer<'a> {
    fn new(
        graph: &'a ConflictGraph,
        ids: &'a [usize],
        scores: &'a [f64],
        words: usize,
        config: &SearchConfig,
    ) -> Self {
        let mut by_word: Vec<Vec<usize>> = vec![Vec::new(); words];
        for candidate in 0..graph.len() {
            let mask = graph.mask(candidate);
            for (word, slot) in by_word.iter_mut().enumerate() {
                if mask & (1u128 << word) != 0 {
                    slot.push(candidate);
                }
            }
        }
        for slot in &mut by_word {
            slot.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(ids[a].cmp(&ids[b])));
        }

        let full = if words == 128 {
            u128::MAX
        } else {
            (1u128 << words) - 1
        };

        Self {
            graph,
            ids,
            scores,
            group_size: config.group_size.max(1),
            words,
            full,
            by_word,
            blocked: vec![0; graph.len()],
            chosen: Vec::new(),
            covered: 0,
            partial_score: 0.0,
            best: None,
            best_partial: Selection::default(),
            nodes: 0,
            nodes_in_pass: 0,
            limit: config.node_limit,
            stopped: false,
            truncated: false,
        }
    }

    /// Count a node against the per-pass limit; false once it is exhausted.
    fn enter(&mut self) -> bool {
        self.nodes += 1;
        self.nodes_in_pass += 1;
        if self.nodes_in_pass > self.limit {
            self.stopped = true;
            self.truncated = true;
        }
        !self.stopped
    }

    fn visit(&mut self) {
        if !self.enter() {
            return;
        }

        if self.covered == self.full {
            self.offer_complete();
            return;
        }

        let mut target: Option<(usize, usize)> = None;
        let mut bound = self.partial_score;
        for word in 0..self.words {
            if self.covered & (1u128 << word) != 0 {
                continue;
            }
            let mut available = 0;
            let mut share = f64::NEG_INFINITY;
            for &candidate in &self.by_word[word] {
                if self.blocked[candidate] == 0 {
                    available += 1;
                    share = share.max(self.scores[candidate] / self.group_size as f64);
                }
            }
            if available == 0 {
                return;
            }
            bound += share;
            if target.map_or(true, |(_, fewest)| available < fewest) {
                target = Some((word, available));
            }
        }

        if let Some(best) = &self.best {
            if bound < best.total_score - SCORE_EPSILON {
                return;
            }
        }

        let Some((word, _)) = target else {
            return;
        };
        let options: Vec<usize> = self.by_word[word]
            .iter()
            .copied()
            .filter(|&c| self.blocked[c] == 0)
            .collect();
        for candidate in options {
            self.select(candidate);
            self.visit();
            self.deselect(candidate);
            if self.stopped {
                return;
            }
        }
    }

    /// Enumerate disjoint packings from candidate `from` onwards.
    fn pack(&mut self, from: usize) {
        if !self.enter() {
            return;
        }
        self.offer_partial();

        let available: Vec<usize> = (from..self.graph.len())
            .filter(|&c| self.blocked[c] == 0)
            .collect();
        let uncovered = (self.full & !self.covered).count_ones() as usize;
        let reachable = self.chosen.len() + available.len().min(uncovered / self.group_size);
        let incumbent = self.best_partial.len();
        if reachable < incumbent {
            return;
        }
        if reachable == incumbent {
            let mut best_scores: Vec<f64> = available.iter().map(|&c| self.scores[c]).collect();
            best_scores.sort_by(|a, b| b.total_cmp(a));
            let needed = incumbent - self.chosen.len();
            let ceiling = self.partial_score + best_scores.iter().take(needed).sum::<f64>();
            if ceiling <= self.best_partial.total_score + SCORE_EPSILON {
                return;
            }
        }

        for candidate in available {
            if self.blocked[candidate] != 0 {
                continue;
            }
            self.select(candidate);
            self.pack(candidate + 1);
            self.deselect(candidate);
            if self.stopped {
                return;
            }
        }
    }

    fn select(&mut self, candidate: usize) {
        let graph = self.graph;
        for &n in graph.neighbours(candidate) {
            self.blocked[n] += 1;
        }
        self.chosen.push(candidate);
        self.covered |= graph.mask(candidate);
        self.partial_score += self.scores[candidate];
    }

    fn deselect(&mut self, candidate: usize) {
        let graph = self.graph;
        for &n in graph.neighbours(candidate) {
            self.blocked[n] -= 1;
        }
        self.chosen.pop();
        self.covered &= !graph.mask(candidate);
        self.partial_score -= self.scores[candidate];
    }

    fn snapshot(&self, complete: bool) -> Selection {
        let mut candidates: Vec<usize> = self.chosen.iter().map(|&c| self.ids[c]).collect();
        candidates.sort_unstable();
        // Re-sum in caller order so equal selections carry bitwise-equal totals.
        let mut by_id: Vec<(usize, f64)> = self
            .chosen
            .iter()
            .map(|&c| (self.ids[c], self.scores[c]))
            .collect();
        by_id.sort_by_key(|&(id, _)| id);
        Selection {
            candidates,
            total_score: by_id.iter().map(|&(_, s)| s).sum(),
            min_score: by_id.iter().map(|&(_, s)| s).reduce(f64::min),
            covered: self.covered.count_ones() as usize,
            complete,
        }
    }

    fn offer_complete(&mut self) {
        let found = self.snapshot(true);
        let better = match &self.best {
            Some(best) => found.outranks(best),
            None => true,
        };
        if better {
            self.best = Some(found);
        }
    }

    fn offer_partial(&mut self) {
        let placed = self.chosen.len();
        let incumbent = &self.best_partial;
        let better = placed > incumbent.len()
            || (placed == incumbent.len()
                && placed > 0
                && self.partial_score > incumbent.total_score + SCORE_EPSILON);
        if better {
            self.best_partial = self.snapshot(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn search(group_size: usize, groups: usize) -> PartitionSearch {
        PartitionSearch::new(SearchConfig {
            group_size,
            groups,
            node_limit: 1_000_000,
        })
    }

    fn c(members: &[usize], score: f64) -> SearchCandidate {
        SearchCandidate::new(members.to_vec(), score)
    }

    fn is_exact_cover(words: usize, candidates: &[SearchCandidate], selection: &Selection) -> bool {
        let mut seen = vec![false; words];
        for &i in &selection.candidates {
            for &w in &candidates[i].members {
                if seen[w] {
                    return false;
                }
                seen[w] = true;
            }
        }
        seen.into_iter().all(|s| s)
    }

    #[test]
    fn finds_the_only_cover_among_decoys() {
        let candidates = vec![
            c(&[0, 1, 2, 3], -5.0),
            c(&[4, 5, 6, 7], -5.0),
            c(&[8, 9, 10, 11], -5.0),
            c(&[12, 13, 14, 15], -5.0),
            c(&[0, 1, 2, 4], -1.0),
            c(&[3, 5, 6, 8], -1.0),
        ];
        let outcome = search(4, 4).search(16, &candidates).unwrap();
        assert_eq!(outcome.best.candidates, vec![0, 1, 2, 3]);
        assert!(outcome.best.complete);
        assert_eq!(outcome.best.covered, 16);
        assert_eq!(outcome.best.total_score, -20.0);
        assert!(!outcome.truncated);
    }

    #[test]
    fn maximises_total_score() {
        let candidates = vec![
            c(&[0, 1], -1.0),
            c(&[2, 3], -1.0),
            c(&[0, 2], -0.5),
            c(&[1, 3], -0.5),
        ];
        let outcome = search(2, 2).search(4, &candidates).unwrap();
        assert_eq!(outcome.best.candidates, vec![2, 3]);
        assert_eq!(outcome.best.total_score, -1.0);
    }

    #[test]
    fn equal_totals_prefer_the_stronger_weakest_group() {
        let candidates = vec![
            c(&[0, 1], -1.0),
            c(&[2, 3], -3.0),
            c(&[0, 2], -2.0),
            c(&[1, 3], -2.0),
        ];
        let outcome = search(2, 2).search(4, &candidates).unwrap();
        assert_eq!(outcome.best.candidates, vec![2, 3]);
        assert_eq!(outcome.best.min_score, Some(-2.0));
    }

    #[test]
    fn full_ties_prefer_smaller_candidate_indices() {
        let candidates = vec![
            c(&[0, 2], -2.0),
            c(&[1, 3], -2.0),
            c(&[0, 1], -2.0),
            c(&[2, 3], -2.0),
        ];
        let outcome = search(2, 2).search(4, &candidates).unwrap();
        assert_eq!(outcome.best.candidates, vec![0, 1]);
    }

    #[test]
    fn too_few_disjoint_groups_is_no_complete_partition() {
        let candidates = vec![
            c(&[0, 1, 2, 3], -1.0),
            c(&[4, 5, 6, 7], -1.0),
            c(&[8, 9, 10, 11], -1.0),
            c(&[11, 12, 13, 14], -0.5),
        ];
        match search(4, 4).search(16, &candidates) {
            Err(SearchError::NoCompletePartition { partial, uncovered }) => {
                assert_eq!(partial.len(), 3);
                assert_eq!(partial.candidates, vec![0, 1, 3]);
                assert_eq!(partial.total_score, -2.5);
                assert_eq!(uncovered, 4);
                assert!(!partial.complete);
            }
            other => panic!("expected NoCompletePartition, got {:?}", other),
        }
    }

    #[test]
    fn partial_prefers_more_groups_then_score() {
        let candidates = vec![
            c(&[0, 1], -0.1),
            c(&[2, 3], -9.0),
            c(&[4, 5], -9.0),
            c(&[1, 2], -0.1),
            c(&[2, 3], -1.0),
        ];
        let err = search(2, 4).search(8, &candidates).unwrap_err();
        let SearchError::NoCompletePartition { partial, uncovered } = err else {
            panic!("expected NoCompletePartition");
        };
        assert_eq!(partial.candidates, vec![0, 2, 4]);
        assert_eq!(partial.covered, 6);
        assert_eq!(uncovered, 2);
    }

    #[test]
    fn malformed_candidates_are_ignored() {
        let candidates = vec![
            c(&[0, 1, 2], 10.0),
            c(&[0, 0], 10.0),
            c(&[0, 9], 10.0),
            c(&[0, 1], f64::NAN),
            c(&[0, 1], -1.0),
            c(&[2, 3], -1.0),
        ];
        let outcome = search(2, 2).search(4, &candidates).unwrap();
        assert_eq!(outcome.best.candidates, vec![4, 5]);
    }

    #[test]
    fn node_limit_truncates() {
        let candidates = vec![c(&[0, 1], -1.0), c(&[2, 3], -1.0)];
        let limited = PartitionSearch::new(SearchConfig {
            group_size: 2,
            groups: 2,
            node_limit: 1,
        });
        let err = limited.search(4, &candidates).unwrap_err();
        assert!(matches!(err, SearchError::NoCompletePartition { uncovered: 4, .. }));
    }

    #[test]
    fn oversized_boards_are_rejected() {
        assert_eq!(
            search(4, 4).search(129, &[]).unwrap_err(),
            SearchError::TooLarge { words: 129 }
        );
    }

    #[test]
    fn search_error_converts_to_rsa_error() {
        let err: connections_types::RsaError = SearchError::NoCompletePartition {
            partial: Selection::default(),
            uncovered: 16,
        }
        .into();
        assert_eq!(err.to_string(), "no complete partition: 16 word(s) left uncovered");
    }

    // ── Properties ──────────────────────────────────────────────────────

    /// Exhaustive maximum over all disjoint covers, for cross-checking.
    fn brute_force(words: usize, groups: usize, candidates: &[SearchCandidate]) -> Option<f64> {
        fn go(
            start: usize,
            left: usize,
            used: u128,
            total: f64,
            words: usize,
            candidates: &[SearchCandidate],
            best: &mut Option<f64>,
        ) {
            if left == 0 {
                if used.count_ones() as usize == words {
                    *best = Some(best.map_or(total, |b: f64| b.max(total)));
                }
                return;
            }
            for i in start..candidates.len() {
                let Some(mask) = candidates[i].mask(words) else {
                    continue;
                };
                if mask & used == 0 {
                    go(i + 1, left - 1, used | mask, total + candidates[i].score, words, candidates, best);
                }
            }
        }
        let mut best = None;
        go(0, groups, 0, 0.0, words, candidates, &mut best);
        best
    }

    fn arb_candidates() -> impl Strategy<Value = Vec<SearchCandidate>> {
        let planted = Just((0..8usize).collect::<Vec<_>>()).prop_shuffle();
        let decoys = prop::collection::vec(
            (prop::sample::subsequence((0..8usize).collect::<Vec<_>>(), 2), -10.0f64..0.0),
            0..10,
        );
        let planted_scores = prop::collection::vec(-10.0f64..0.0, 4);
        (planted, planted_scores, decoys).prop_map(|(order, scores, decoys)| {
            let mut all: Vec<SearchCandidate> = order
                .chunks(2)
                .zip(scores)
                .map(|(pair, score)| SearchCandidate::new(pair.to_vec(), score))
                .collect();
            all.extend(decoys.into_iter().map(|(m, s)| SearchCandidate::new(m, s)));
            all
        })
    }

    proptest! {
        #[test]
        fn result_is_an_optimal_exact_cover(candidates in arb_candidates()) {
            let outcome = search(2, 4).search(8, &candidates).unwrap();
            prop_assert!(outcome.best.complete);
            prop_assert!(is_exact_cover(8, &candidates, &outcome.best));
            prop_assert_eq!(outcome.best.len(), 4);

            let optimum = brute_force(8, 4, &candidates).unwrap();
            prop_assert!((outcome.best.total_score - optimum).abs() < 1e-9);
        }

        #[test]
        fn search_is_deterministic(candidates in arb_candidates()) {
            let a = search(2, 4).search(8, &candidates).unwrap();
            let b = search(2, 4).search(8, &candidates).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
