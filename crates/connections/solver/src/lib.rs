//! # connections-solver
//!
//! The round-based solver loop tying the oracles, the RSA engine and the
//! partition search together.
//!
//! ```text
//!                 ┌──────────────────────┐
//!   Board ──────► │      RsaSolver       │ ──► Solution | FailureReport
//!                 └──────────┬───────────┘
//!          ┌─────────────────┼──────────────────┐
//!          ▼                 ▼                  ▼
//!   HypothesisOracle   SemanticScorer     RsaEngine ──► PartitionSearch
//! ```
//!
//! [`RsaSolver::play`] drives a [`connections_game::ConnectionsGame`] by
//! repeatedly solving the remaining board and guessing the most confident
//! group.

#![deny(unsafe_code)]

pub mod error;
pub mod play;
pub mod pool;
pub mod solver;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use error::{SolverError, SolverResult};
pub use play::{GuessRecord, PlayReport};
pub use pool::{Offer, UtterancePool};
pub use solver::RsaSolver;
