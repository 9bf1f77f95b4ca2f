//! Store contracts consumed by the grouping engine.
//!
//! Implementations must be safe to share across tasks. Every method is a
//! single atomic step: a reader never observes half of a `record_match`.

use luma_core::types::{GroupId, GroupedIntent, Intent, IntentId, InteractionEvent};

use crate::error::StoreError;

/// Holds every submitted intent, independent of grouping.
pub trait IntentStore: Send + Sync {
    /// Allocate the next sequential id and store a new, ungrouped intent.
    fn insert(
        &self,
        intent_text: String,
        interaction_events: Vec<InteractionEvent>,
    ) -> Result<Intent, StoreError>;

    /// Find an intent by id.
    fn get(&self, id: IntentId) -> Result<Option<Intent>, StoreError>;

    /// Set the back-reference from an intent to its group.
    ///
    /// Fails with [`StoreError::AlreadyAssigned`] if the intent already
    /// belongs to a group.
    fn assign_group(&self, id: IntentId, group: GroupId) -> Result<Intent, StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Immutable interaction records keyed by owning intent.
pub trait InteractionEventStore: Send + Sync {
    /// Record the events submitted with an intent. Replaces nothing: a second
    /// `put` for the same intent is ignored.
    fn put(&self, intent: IntentId, events: Vec<InteractionEvent>) -> Result<(), StoreError>;

    fn get(&self, intent: IntentId) -> Result<Option<Vec<InteractionEvent>>, StoreError>;
}

/// Canonical groups, one per distinct semantic intent.
pub trait GroupedIntentStore: Send + Sync {
    /// Allocate the next sequential id and create a group with `count = 1`.
    ///
    /// Fails with [`StoreError::DuplicateCanonicalText`] if a group with the
    /// same canonical text already exists.
    fn create(
        &self,
        intent_text: String,
        interaction_events: Vec<InteractionEvent>,
    ) -> Result<GroupedIntent, StoreError>;

    fn get(&self, id: GroupId) -> Result<Option<GroupedIntent>, StoreError>;

    /// Exact canonical-text lookup.
    fn find_by_text(&self, intent_text: &str) -> Result<Option<GroupedIntent>, StoreError>;

    /// Canonical texts of all groups, ordered by group id.
    fn canonical_texts(&self) -> Result<Vec<String>, StoreError>;

    /// Count one more member intent. When `events` is `Some`, they are
    /// appended to the aggregate in the same step.
    fn record_match(
        &self,
        id: GroupId,
        events: Option<&[InteractionEvent]>,
    ) -> Result<GroupedIntent, StoreError>;

    /// All groups, ordered by id.
    fn list(&self) -> Result<Vec<GroupedIntent>, StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
