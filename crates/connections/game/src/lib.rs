//! # connections-game
//!
//! A Connections game simulator for driving solvers end to end.
//!
//! ```text
//!   answers JSON ──► Puzzle ──► ConnectionsGame ◄── guess(words)
//!                                     │
//!                                     ▼
//!                   GuessOutcome ──► GameMetrics (points, solve rate)
//! ```
//!
//! Puzzles load from the public answers dataset format; a game tracks
//! solved categories and strikes, and [`GameMetrics`] scores a run.

#![deny(unsafe_code)]

pub mod error;
pub mod game;
pub mod metrics;
pub mod puzzle;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use error::{GameError, GameResult};
pub use game::{ConnectionsGame, GuessOutcome, DEFAULT_MAX_STRIKES};
pub use metrics::{GameMetrics, PENALTY_PER_FAILED_GUESS, POINTS_PER_SOLVE};
pub use puzzle::{Puzzle, PuzzleCategory, PuzzleSet};
