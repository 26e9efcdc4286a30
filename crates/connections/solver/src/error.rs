use connections_game::GameError;
use connections_types::RsaError;
use thiserror::Error;

/// Errors surfaced by the play driver and solver construction.
///
/// `solve` itself never fails with one of these: it returns a
/// [`connections_types::FailureReport`] instead.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("game error: {0}")]
    Game(#[from] GameError),

    #[error(transparent)]
    Rsa(#[from] RsaError),
}

/// Result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;
