//! Luma Engine crate - intent grouping and deduplication.
//!
//! [`IntentGroupingEngine`] decides whether a submitted intent joins an
//! existing canonical group (exact text first, then the similarity oracle)
//! or founds a new one, and answers interaction-history lookups the same way.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::IntentGroupingEngine;
pub use error::GroupingError;
pub use types::{EngineStats, MatchOutcome, Submission};
