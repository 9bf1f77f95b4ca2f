use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Sequential identifier of a submitted intent. Allocation starts at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(pub u64);

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential identifier of a canonical intent group. Allocation starts at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain records
// =============================================================================

/// A single UI interaction captured alongside an intent.
///
/// Immutable once created. Attached to exactly one [`Intent`] and copied into
/// the aggregate of the [`GroupedIntent`] it lands in.
///
/// Only `timestamp` is required on the wire. Clients send partial records,
/// so the descriptive fields default to empty, and any other attributes
/// (e.g. `event_type`) are kept in `extra` and echoed back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub view_id: i64,
    #[serde(default)]
    pub view_resource_name: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub action_type: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One submission of free-text intent, with the events recorded for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub id: IntentId,
    pub intent_text: String,
    /// Events in the order they were submitted.
    pub interaction_events: Vec<InteractionEvent>,
    pub created_at: DateTime<Utc>,
    /// Group this intent was assigned to. Set once, never reassigned.
    pub grouped_intent_id: Option<GroupId>,
}

impl Intent {
    /// Whether the intent has been assigned to a group yet.
    pub fn is_grouped(&self) -> bool {
        self.grouped_intent_id.is_some()
    }
}

/// Canonical group of semantically equivalent intents.
///
/// `intent_text` is the text of the founding intent and never changes.
/// `count` always equals the number of intents that matched into the group,
/// the founding intent included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupedIntent {
    pub id: GroupId,
    pub intent_text: String,
    pub count: u64,
    pub interaction_events: Vec<InteractionEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> InteractionEvent {
        InteractionEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            view_id: 123,
            view_resource_name: "btn_lights".to_string(),
            screen_name: "Home".to_string(),
            action_type: "CLICK".to_string(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_interaction_event_from_wire_json() {
        let json = r#"{
            "timestamp": "2024-01-01T00:00:00Z",
            "view_id": 123,
            "view_resource_name": "btn_lights",
            "screen_name": "Home",
            "action_type": "CLICK"
        }"#;
        let event: InteractionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, sample_event());
    }

    #[test]
    fn test_interaction_event_keeps_unknown_fields() {
        let json = r#"{
            "event_type": "click",
            "timestamp": "2024-01-01T00:00:00Z",
            "view_id": 123,
            "view_resource_name": "btn_lights",
            "screen_name": "Home",
            "action_type": "CLICK"
        }"#;
        let event: InteractionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.view_id, 123);
        assert_eq!(event.extra["event_type"], "click");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_type"], "click");
        assert_eq!(value["view_id"], 123);
    }

    #[test]
    fn test_interaction_event_partial_record() {
        let json = r#"{"event_type": "scroll", "timestamp": "2024-01-01T00:00:01Z"}"#;
        let event: InteractionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.view_id, 0);
        assert!(event.view_resource_name.is_empty());
        assert!(event.screen_name.is_empty());
        assert!(event.action_type.is_empty());
        assert_eq!(event.extra.len(), 1);
    }

    #[test]
    fn test_interaction_event_missing_timestamp_rejected() {
        let json = r#"{"view_id": 1, "view_resource_name": "a", "screen_name": "b", "action_type": "c"}"#;
        assert!(serde_json::from_str::<InteractionEvent>(json).is_err());
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let group = GroupedIntent {
            id: GroupId(7),
            intent_text: "turn on lights".to_string(),
            count: 2,
            interaction_events: vec![],
        };
        let value = serde_json::to_value(&group).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["count"], 2);
        assert_eq!(IntentId(3).to_string(), "3");
        assert_eq!(GroupId(4).to_string(), "4");
    }

    #[test]
    fn test_intent_is_grouped() {
        let mut intent = Intent {
            id: IntentId(1),
            intent_text: "turn on lights".to_string(),
            interaction_events: vec![sample_event()],
            created_at: Utc::now(),
            grouped_intent_id: None,
        };
        assert!(!intent.is_grouped());
        intent.grouped_intent_id = Some(GroupId(1));
        assert!(intent.is_grouped());
    }
}
