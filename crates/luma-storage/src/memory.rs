//! In-memory store implementations.
//!
//! State lives for as long as the owning value does; nothing survives a
//! restart. Each store owns its id counter, so ids stay unique and
//! monotonically increasing regardless of concurrent inserts.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use luma_core::types::{GroupId, GroupedIntent, Intent, IntentId, InteractionEvent};
use tracing::debug;

use crate::error::StoreError;
use crate::repository::{GroupedIntentStore, IntentStore, InteractionEventStore};

fn poisoned<T>(what: &'static str) -> impl FnOnce(PoisonError<T>) -> StoreError {
    move |e| StoreError::LockPoisoned(format!("{}: {}", what, e))
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// In-memory [`IntentStore`].
pub struct InMemoryIntentStore {
    intents: RwLock<BTreeMap<IntentId, Intent>>,
    next_id: AtomicU64,
}

impl InMemoryIntentStore {
    pub fn new() -> Self {
        Self {
            intents: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryIntentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentStore for InMemoryIntentStore {
    fn insert(
        &self,
        intent_text: String,
        interaction_events: Vec<InteractionEvent>,
    ) -> Result<Intent, StoreError> {
        let mut intents = self.intents.write().map_err(poisoned("intents"))?;
        let id = IntentId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let intent = Intent {
            id,
            intent_text,
            interaction_events,
            created_at: Utc::now(),
            grouped_intent_id: None,
        };
        intents.insert(id, intent.clone());
        Ok(intent)
    }

    fn get(&self, id: IntentId) -> Result<Option<Intent>, StoreError> {
        let intents = self.intents.read().map_err(poisoned("intents"))?;
        Ok(intents.get(&id).cloned())
    }

    fn assign_group(&self, id: IntentId, group: GroupId) -> Result<Intent, StoreError> {
        let mut intents = self.intents.write().map_err(poisoned("intents"))?;
        let intent = intents
            .get_mut(&id)
            .ok_or(StoreError::IntentNotFound(id))?;
        if let Some(existing) = intent.grouped_intent_id {
            return Err(StoreError::AlreadyAssigned {
                intent: id,
                group: existing,
            });
        }
        intent.grouped_intent_id = Some(group);
        Ok(intent.clone())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let intents = self.intents.read().map_err(poisoned("intents"))?;
        Ok(intents.len())
    }
}

// ---------------------------------------------------------------------------
// Interaction events
// ---------------------------------------------------------------------------

/// In-memory [`InteractionEventStore`].
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<IntentId, Vec<InteractionEvent>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InteractionEventStore for InMemoryEventStore {
    fn put(&self, intent: IntentId, events: Vec<InteractionEvent>) -> Result<(), StoreError> {
        let mut map = self.events.write().map_err(poisoned("events"))?;
        map.entry(intent).or_insert(events);
        Ok(())
    }

    fn get(&self, intent: IntentId) -> Result<Option<Vec<InteractionEvent>>, StoreError> {
        let map = self.events.read().map_err(poisoned("events"))?;
        Ok(map.get(&intent).cloned())
    }
}

// ---------------------------------------------------------------------------
// Grouped intents
// ---------------------------------------------------------------------------

#[derive(Default)]
struct GroupTable {
    groups: BTreeMap<GroupId, GroupedIntent>,
    /// Canonical text -> group, for the exact-match fast path.
    by_text: HashMap<String, GroupId>,
}

/// In-memory [`GroupedIntentStore`] with a canonical-text index.
pub struct InMemoryGroupedIntentStore {
    table: RwLock<GroupTable>,
    next_id: AtomicU64,
}

impl InMemoryGroupedIntentStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(GroupTable::default()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryGroupedIntentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupedIntentStore for InMemoryGroupedIntentStore {
    fn create(
        &self,
        intent_text: String,
        interaction_events: Vec<InteractionEvent>,
    ) -> Result<GroupedIntent, StoreError> {
        let mut table = self.table.write().map_err(poisoned("groups"))?;
        if table.by_text.contains_key(&intent_text) {
            return Err(StoreError::DuplicateCanonicalText(intent_text));
        }
        let id = GroupId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let group = GroupedIntent {
            id,
            intent_text: intent_text.clone(),
            count: 1,
            interaction_events,
        };
        table.by_text.insert(intent_text, id);
        table.groups.insert(id, group.clone());
        debug!(group_id = %id, groups = table.groups.len(), "Grouped intent created");
        Ok(group)
    }

    fn get(&self, id: GroupId) -> Result<Option<GroupedIntent>, StoreError> {
        let table = self.table.read().map_err(poisoned("groups"))?;
        Ok(table.groups.get(&id).cloned())
    }

    fn find_by_text(&self, intent_text: &str) -> Result<Option<GroupedIntent>, StoreError> {
        let table = self.table.read().map_err(poisoned("groups"))?;
        Ok(table
            .by_text
            .get(intent_text)
            .and_then(|id| table.groups.get(id))
            .cloned())
    }

    fn canonical_texts(&self) -> Result<Vec<String>, StoreError> {
        let table = self.table.read().map_err(poisoned("groups"))?;
        Ok(table
            .groups
            .values()
            .map(|g| g.intent_text.clone())
            .collect())
    }

    fn record_match(
        &self,
        id: GroupId,
        events: Option<&[InteractionEvent]>,
    ) -> Result<GroupedIntent, StoreError> {
        let mut table = self.table.write().map_err(poisoned("groups"))?;
        let group = table
            .groups
            .get_mut(&id)
            .ok_or(StoreError::GroupNotFound(id))?;
        group.count += 1;
        if let Some(events) = events {
            group.interaction_events.extend_from_slice(events);
        }
        Ok(group.clone())
    }

    fn list(&self) -> Result<Vec<GroupedIntent>, StoreError> {
        let table = self.table.read().map_err(poisoned("groups"))?;
        Ok(table.groups.values().cloned().collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let table = self.table.read().map_err(poisoned("groups"))?;
        Ok(table.groups.len())
    }
}
