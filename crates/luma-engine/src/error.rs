//! Error types for the grouping engine.

use luma_core::error::LumaError;
use luma_storage::StoreError;

/// Errors from grouping operations.
///
/// Oracle failures never appear here: they degrade to "no match".
#[derive(Debug, thiserror::Error)]
pub enum GroupingError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<GroupingError> for LumaError {
    fn from(err: GroupingError) -> Self {
        match err {
            GroupingError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luma_core::types::GroupId;

    #[test]
    fn test_grouping_error_from_store_error() {
        let err: GroupingError = StoreError::GroupNotFound(GroupId(2)).into();
        assert_eq!(err.to_string(), "Store error: Grouped intent not found: 2");

        let luma: LumaError = err.into();
        assert!(matches!(luma, LumaError::Storage(_)));
    }
}
