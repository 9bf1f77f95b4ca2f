//! Luma Oracle crate - semantic similarity judgments behind a trait.
//!
//! - [`SimilarityOracle`] is the capability the grouping engine consumes.
//! - [`ExactMatchOracle`] and [`NoopOracle`] are deterministic and make no
//!   outbound calls.
//! - [`LlmSimilarityOracle`] asks an OpenAI-compatible chat-completions
//!   endpoint and fails closed on any error.

pub mod error;
pub mod factory;
pub mod llm;
pub mod oracle;

pub use error::OracleError;
pub use factory::oracle_from_config;
pub use llm::{LlmOracleConfig, LlmSimilarityOracle};
pub use oracle::{ExactMatchOracle, NoopOracle, SimilarityOracle};
