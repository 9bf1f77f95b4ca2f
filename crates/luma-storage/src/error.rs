//! Error types for the intent stores.

use luma_core::error::LumaError;
use luma_core::types::{GroupId, IntentId};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Intent not found: {0}")]
    IntentNotFound(IntentId),
    #[error("Grouped intent not found: {0}")]
    GroupNotFound(GroupId),
    #[error("Intent {intent} is already assigned to group {group}")]
    AlreadyAssigned { intent: IntentId, group: GroupId },
    #[error("A group with canonical text {0:?} already exists")]
    DuplicateCanonicalText(String),
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<StoreError> for LumaError {
    fn from(err: StoreError) -> Self {
        LumaError::Storage(err.to_string())
    }
}
