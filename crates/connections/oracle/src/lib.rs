//! # connections-oracle
//!
//! The solver's two external collaborators, specified only by interface:
//!
//! - [`EmbeddingOracle`] turns words and phrases into meaning vectors and
//!   defines the similarity between them.
//! - [`HypothesisOracle`] proposes category hypotheses for a set of words.
//!
//! [`SemanticScorer`] sits in front of the embedding oracle for one solve,
//! caching vectors and computing literal similarity rows.
//!
//! Network-backed oracles live outside this workspace. The implementations
//! here are deterministic and in-process: [`LexicalEmbeddingOracle`] for
//! offline use, [`TableEmbeddingOracle`] and [`ScriptedHypothesisOracle`]
//! for tests and simulations.

#![deny(unsafe_code)]

pub mod error;
pub mod lexical;
pub mod scorer;
pub mod scripted;
pub mod table;
pub mod traits;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use error::{OracleError, OracleResult};
pub use lexical::{LexicalEmbeddingOracle, DEFAULT_LEXICAL_DIM};
pub use scorer::{EmbeddingBatch, SemanticScorer};
pub use scripted::{ScriptedHypothesisOracle, ScriptedRound};
pub use table::TableEmbeddingOracle;
pub use traits::{EmbeddingOracle, HypothesisOracle, ProposalRequest};
