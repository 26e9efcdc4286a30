//! # connections-search
//!
//! Partition search: choose disjoint candidate groups that cover the board
//! exactly once with the highest total score.
//!
//! Candidates are referred to by index and word sets are 128-bit masks, so
//! backtracking never copies word data. When no exact cover exists the
//! search reports the best partial packing instead of inventing a group.

#![deny(unsafe_code)]

pub mod error;
pub mod graph;
pub mod search;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use error::{SearchError, SearchResult};
pub use graph::{ConflictGraph, SearchCandidate};
pub use search::{PartitionSearch, SearchOutcome, Selection, SCORE_EPSILON};
