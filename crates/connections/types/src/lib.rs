//! # connections-types
//!
//! Shared data model for the Connections RSA solver.
//!
//! Every other crate in the workspace speaks in these types: the immutable
//! [`Board`], the [`CategoryHypothesis`] proposals an oracle produces, the
//! board-resolved [`Utterance`]s the inference engine reasons about, and the
//! [`Partition`] the search assembles from them.
//!
//! ```text
//!   CategoryHypothesis ──resolve──▶ Utterance ──engine──▶ scored candidate
//!                                                              │
//!                                     Partition ◀──search──────┘
//!                                         │
//!                           Solution / FailureReport
//! ```
//!
//! Identifiers are content-derived ([`UtteranceId`] is a BLAKE3 digest of the
//! normalised label and sorted words), so two runs over the same inputs
//! produce the same ids and the same tie-breaks.

#![deny(unsafe_code)]

pub mod board;
pub mod config;
pub mod error;
pub mod partition;
pub mod report;
pub mod utterance;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use board::{normalize, Board, Word, MAX_BOARD_WORDS};
pub use config::{EngineConfig, RationalityConfig, SearchConfig, SolverConfig};
pub use error::{BoardError, RsaError, RsaResult};
pub use partition::{Group, Partition};
pub use report::{FailureReport, RoundOutcome, RoundReport, Solution, SolverPhase};
pub use utterance::{CategoryHypothesis, MeaningVector, Utterance, UtteranceId};
