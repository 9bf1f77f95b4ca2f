use thiserror::Error;

/// Top-level error type for the Luma system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for LumaError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LumaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for LumaError {
    fn from(err: toml::de::Error) -> Self {
        LumaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LumaError {
    fn from(err: toml::ser::Error) -> Self {
        LumaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LumaError {
    fn from(err: serde_json::Error) -> Self {
        LumaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Luma operations.
pub type Result<T> = std::result::Result<T, LumaError>;
