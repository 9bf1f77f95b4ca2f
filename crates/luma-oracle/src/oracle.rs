//! The similarity oracle capability and its deterministic implementations.

use async_trait::async_trait;
use tracing::warn;

use crate::error::OracleError;

/// Answers whether two intent texts mean the same thing.
///
/// Implementors supply the fallible [`judge`](Self::judge) and
/// [`select`](Self::select). Callers use [`are_similar`](Self::are_similar)
/// and [`best_match`](Self::best_match), which fail closed: errors are logged
/// and turned into `false` / `None`, and a selection that is not one of the
/// offered candidates is discarded.
#[async_trait]
pub trait SimilarityOracle: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether `text_a` and `text_b` denote the same intent.
    async fn judge(&self, text_a: &str, text_b: &str) -> Result<bool, OracleError>;

    /// The candidate most similar to `target`, if any is similar enough.
    /// Only called with a non-empty candidate list.
    async fn select(
        &self,
        target: &str,
        candidates: &[String],
    ) -> Result<Option<String>, OracleError>;

    async fn are_similar(&self, text_a: &str, text_b: &str) -> bool {
        match self.judge(text_a, text_b).await {
            Ok(similar) => similar,
            Err(e) => {
                warn!(oracle = self.name(), error = %e, "Similarity check failed, treating as not similar");
                false
            }
        }
    }

    async fn best_match(&self, target: &str, candidates: &[String]) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }
        match self.select(target, candidates).await {
            Ok(Some(choice)) if candidates.contains(&choice) => Some(choice),
            Ok(Some(choice)) => {
                warn!(oracle = self.name(), choice = %choice, "Oracle picked a text outside the candidate set, ignoring");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(oracle = self.name(), error = %e, "Best-match lookup failed, treating as no match");
                None
            }
        }
    }
}

/// Collapse whitespace runs and lowercase.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Treats two texts as the same intent only when they are equal after
/// whitespace and case normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatchOracle;

#[async_trait]
impl SimilarityOracle for ExactMatchOracle {
    fn name(&self) -> &str {
        "exact"
    }

    async fn judge(&self, text_a: &str, text_b: &str) -> Result<bool, OracleError> {
        Ok(normalize(text_a) == normalize(text_b))
    }

    async fn select(
        &self,
        target: &str,
        candidates: &[String],
    ) -> Result<Option<String>, OracleError> {
        let target = normalize(target);
        Ok(candidates.iter().find(|c| normalize(c) == target).cloned())
    }
}

/// Never reports a match. Leaves grouping to the engine's exact fast path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOracle;

#[async_trait]
impl SimilarityOracle for NoopOracle {
    fn name(&self) -> &str {
        "none"
    }

    async fn judge(&self, _text_a: &str, _text_b: &str) -> Result<bool, OracleError> {
        Ok(false)
    }

    async fn select(
        &self,
        _target: &str,
        _candidates: &[String],
    ) -> Result<Option<String>, OracleError> {
        Ok(None)
    }
}
