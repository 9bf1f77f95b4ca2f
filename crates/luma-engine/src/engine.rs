//! The intent grouping engine.
//!
//! Submissions are serialized per engine: the exact lookup, the oracle call,
//! and the create-or-increment all happen under one async lock, so two
//! concurrent submissions of the same new text cannot found two groups.
//! All writes of a submission happen after its last await.
//! Lookups take no engine lock and rely on the stores' per-call atomicity.

use std::sync::Arc;

use luma_core::config::{EventMergePolicy, LumaConfig};
use luma_core::types::{GroupId, GroupedIntent, Intent, IntentId, InteractionEvent};
use luma_oracle::SimilarityOracle;
use luma_storage::{
    GroupedIntentStore, InMemoryEventStore, InMemoryGroupedIntentStore, InMemoryIntentStore,
    IntentStore, InteractionEventStore,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::GroupingError;
use crate::types::{EngineStats, MatchOutcome, Submission};

/// Default number of group texts offered per oracle call.
const DEFAULT_MAX_CANDIDATES: usize = 200;

/// Groups semantically equivalent intents under one canonical entry.
pub struct IntentGroupingEngine {
    intents: Arc<dyn IntentStore>,
    events: Arc<dyn InteractionEventStore>,
    groups: Arc<dyn GroupedIntentStore>,
    oracle: Arc<dyn SimilarityOracle>,
    merge_policy: EventMergePolicy,
    max_candidates: usize,
    submit_lock: Mutex<()>,
}

impl IntentGroupingEngine {
    /// Create an engine over fresh in-memory stores.
    pub fn new(oracle: Arc<dyn SimilarityOracle>) -> Self {
        Self {
            intents: Arc::new(InMemoryIntentStore::new()),
            events: Arc::new(InMemoryEventStore::new()),
            groups: Arc::new(InMemoryGroupedIntentStore::new()),
            oracle,
            merge_policy: EventMergePolicy::default(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            submit_lock: Mutex::new(()),
        }
    }

    /// Create an engine with the merge policy and candidate cap from config.
    pub fn from_config(config: &LumaConfig, oracle: Arc<dyn SimilarityOracle>) -> Self {
        Self::new(oracle)
            .with_merge_policy(config.grouping.merge_policy)
            .with_max_candidates(config.oracle.max_candidates)
    }

    /// Swap in externally owned stores.
    pub fn with_stores(
        mut self,
        intents: Arc<dyn IntentStore>,
        events: Arc<dyn InteractionEventStore>,
        groups: Arc<dyn GroupedIntentStore>,
    ) -> Self {
        self.intents = intents;
        self.events = events;
        self.groups = groups;
        self
    }

    pub fn with_merge_policy(mut self, policy: EventMergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn merge_policy(&self) -> EventMergePolicy {
        self.merge_policy
    }

    /// Name of the backing oracle, for health reporting.
    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Record an intent and group it. Returns the intent with its own events.
    ///
    /// The caller validates that `intent_text` is non-empty.
    pub async fn create_intent(
        &self,
        intent_text: &str,
        interaction_events: Vec<InteractionEvent>,
    ) -> Result<Intent, GroupingError> {
        self.submit(intent_text, interaction_events)
            .await
            .map(|s| s.intent)
    }

    /// Like [`create_intent`](Self::create_intent), also reporting the group
    /// and which path matched.
    pub async fn submit(
        &self,
        intent_text: &str,
        interaction_events: Vec<InteractionEvent>,
    ) -> Result<Submission, GroupingError> {
        let _guard = self.submit_lock.lock().await;

        // The oracle call is the only await point. Nothing is written before
        // it, so a submission dropped mid-call leaves no ungrouped intent.
        let resolved = self.resolve(intent_text).await?;

        let intent = self
            .intents
            .insert(intent_text.to_string(), interaction_events.clone())?;
        self.events.put(intent.id, interaction_events.clone())?;

        let (group, outcome) = match resolved {
            Some((group, outcome)) => {
                let appended = match self.merge_policy {
                    EventMergePolicy::Append => Some(interaction_events.as_slice()),
                    EventMergePolicy::KeepCanonical => None,
                };
                (self.groups.record_match(group.id, appended)?, outcome)
            }
            None => (
                self.groups
                    .create(intent_text.to_string(), interaction_events)?,
                MatchOutcome::Created,
            ),
        };

        let intent = self.intents.assign_group(intent.id, group.id)?;

        info!(
            intent_id = %intent.id,
            group_id = %group.id,
            count = group.count,
            outcome = %outcome,
            "Intent recorded"
        );

        Ok(Submission {
            intent,
            group,
            outcome,
        })
    }

    /// Aggregated events of the group matching `intent_text`, or `None` when
    /// no group matches. Never mutates state.
    pub async fn get_interactions(
        &self,
        intent_text: &str,
    ) -> Result<Option<Vec<InteractionEvent>>, GroupingError> {
        let resolved = self.resolve(intent_text).await?;
        match &resolved {
            Some((group, outcome)) => {
                debug!(group_id = %group.id, outcome = %outcome, "Interactions lookup matched")
            }
            None => debug!("Interactions lookup found no group"),
        }
        Ok(resolved.map(|(group, _)| group.interaction_events))
    }

    pub fn get_intent(&self, id: IntentId) -> Result<Option<Intent>, GroupingError> {
        Ok(self.intents.get(id)?)
    }

    /// Events recorded with a single intent, independent of its group.
    pub fn get_intent_events(
        &self,
        id: IntentId,
    ) -> Result<Option<Vec<InteractionEvent>>, GroupingError> {
        Ok(self.events.get(id)?)
    }

    pub fn get_grouped_intent(&self, id: GroupId) -> Result<Option<GroupedIntent>, GroupingError> {
        Ok(self.groups.get(id)?)
    }

    pub fn list_grouped_intents(&self) -> Result<Vec<GroupedIntent>, GroupingError> {
        Ok(self.groups.list()?)
    }

    pub fn stats(&self) -> Result<EngineStats, GroupingError> {
        Ok(EngineStats {
            intents: self.intents.len()?,
            groups: self.groups.len()?,
        })
    }

    /// Exact canonical text first, then the oracle over all group texts,
    /// offered in batches of `max_candidates`, oldest groups first.
    async fn resolve(
        &self,
        intent_text: &str,
    ) -> Result<Option<(GroupedIntent, MatchOutcome)>, GroupingError> {
        if let Some(group) = self.groups.find_by_text(intent_text)? {
            return Ok(Some((group, MatchOutcome::Exact)));
        }

        let candidates = self.groups.canonical_texts()?;
        if candidates.is_empty() {
            return Ok(None);
        }
        let batch_size = match self.max_candidates {
            0 => candidates.len(),
            n => n,
        };
        if candidates.len() > batch_size {
            debug!(
                groups = candidates.len(),
                batch_size,
                "Offering groups to the oracle in batches"
            );
        }

        for batch in candidates.chunks(batch_size) {
            let Some(choice) = self.oracle.best_match(intent_text, batch).await else {
                continue;
            };
            match self.groups.find_by_text(&choice)? {
                Some(group) => return Ok(Some((group, MatchOutcome::Oracle))),
                None => warn!(choice = %choice, "Oracle choice no longer resolves to a group"),
            }
        }
        Ok(None)
    }
}
