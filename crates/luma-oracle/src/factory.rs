//! Build the configured oracle.

use std::sync::Arc;

use luma_core::config::{OracleConfig, OracleProvider};
use tracing::{info, warn};

use crate::llm::{LlmOracleConfig, LlmSimilarityOracle};
use crate::oracle::{ExactMatchOracle, NoopOracle, SimilarityOracle};

/// Create the oracle selected by `[oracle] provider`.
///
/// An LLM oracle that cannot be constructed (missing API key, bad header
/// value) degrades to [`ExactMatchOracle`] with a warning rather than
/// preventing startup.
pub fn oracle_from_config(config: &OracleConfig) -> Arc<dyn SimilarityOracle> {
    match config.provider {
        OracleProvider::Exact => Arc::new(ExactMatchOracle),
        OracleProvider::None => Arc::new(NoopOracle),
        OracleProvider::Llm => {
            match LlmOracleConfig::from_oracle_config(config).and_then(LlmSimilarityOracle::new) {
                Ok(oracle) => {
                    info!(
                        base_url = %config.base_url,
                        model = %config.model,
                        timeout_secs = config.timeout_secs,
                        "LLM similarity oracle ready"
                    );
                    Arc::new(oracle)
                }
                Err(e) => {
                    warn!(error = %e, "LLM oracle unavailable, falling back to exact matching");
                    Arc::new(ExactMatchOracle)
                }
            }
        }
    }
}
