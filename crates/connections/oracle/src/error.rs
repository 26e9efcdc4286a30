use thiserror::Error;

/// Errors raised by embedding and hypothesis oracles.
///
/// All of these are transient from the solver's point of view: a failed
/// call contributes nothing to the round, it never aborts it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The backing service could not be reached or refused the call.
    #[error("oracle transport failure: {0}")]
    Transport(String),

    /// The call did not finish before its deadline.
    #[error("oracle call timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The service answered with something that could not be interpreted.
    #[error("malformed oracle response: {0}")]
    Malformed(String),

    /// A table-backed oracle was asked about text it has no entry for.
    #[error("no embedding for text '{0}'")]
    UnknownText(String),
}

/// Result type for oracle calls.
pub type OracleResult<T> = Result<T, OracleError>;
