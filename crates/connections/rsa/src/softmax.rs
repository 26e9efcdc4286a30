//! Log-space probability utilities.
//!
//! Every distribution in the engine is held as natural-log probabilities and
//! normalised with log-sum-exp; values are exponentiated only for reporting.

/// Tolerance used when checking that a distribution sums to one.
pub const PROBABILITY_EPSILON: f64 = 1e-9;

/// `ln Σ exp(x)`, stable for large and very negative inputs.
///
/// Returns `-inf` for an empty slice or one containing only `-inf`.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Log-probabilities of `softmax(alpha * scores)`.
///
/// Equal scores receive equal mass. An empty input yields an empty output.
pub fn log_softmax(scores: &[f64], alpha: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let scaled: Vec<f64> = scores.iter().map(|&s| alpha * s).collect();
    let norm = log_sum_exp(&scaled);
    scaled.into_iter().map(|s| s - norm).collect()
}

/// Log-probabilities of the uniform distribution over `n` outcomes.
pub fn log_uniform(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![-(n as f64).ln(); n]
}

/// Exponentiate a log-distribution.
pub fn to_probabilities(log_probs: &[f64]) -> Vec<f64> {
    log_probs.iter().map(|&lp| lp.exp()).collect()
}

/// Indices of the `k` largest entries, highest first; ties keep index order.
pub fn top_k(values: &[f64], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));
    order.truncate(k);
    order
}
