//! Error types for similarity oracles.
//!
//! These never reach the grouping engine: [`crate::SimilarityOracle`]
//! converts them into "no result" after logging.

use luma_core::error::LumaError;

/// Errors from a similarity oracle backend.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle configuration error: {0}")]
    Config(String),
    #[error("oracle transport error: {0}")]
    Transport(String),
    #[error("oracle call timed out after {0} ms")]
    Timeout(u64),
    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OracleError::Timeout(0)
        } else if err.is_decode() {
            OracleError::MalformedResponse(err.to_string())
        } else {
            OracleError::Transport(err.to_string())
        }
    }
}

impl From<OracleError> for LumaError {
    fn from(err: OracleError) -> Self {
        LumaError::Oracle(err.to_string())
    }
}
