//! # connections-rsa
//!
//! Rational Speech-Act inference over a pool of category utterances.
//!
//! ```text
//!   literal scores ──softmax(α₀)──▶ L₀(w|u)
//!                                     │
//!              ┌──────────────────────┘
//!              ▼            for d = 1..=D
//!   S_d(u|w) ∝ L_{d-1}(w|u)^α₁  ──▶  L_d(w|u) ∝ S_d(u|w)^α₂
//!                                     │
//!                                     ▼
//!              score(u) = Σ ln L_D(w|u) over claimed words
//! ```
//!
//! All tables are held in log-space and rebuilt from scratch for every
//! pool; nothing is shared or mutated between calls.

#![deny(unsafe_code)]

pub mod belief;
pub mod engine;
pub mod literal;
pub mod softmax;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use belief::BeliefLadder;
pub use engine::{InferenceDiagnostics, InferenceResult, RsaEngine};
pub use literal::LiteralMeaningTable;
pub use softmax::{log_softmax, log_sum_exp, top_k, PROBABILITY_EPSILON};
