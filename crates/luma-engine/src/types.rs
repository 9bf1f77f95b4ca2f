use std::fmt;

use luma_core::types::{GroupedIntent, Intent};
use serde::{Deserialize, Serialize};

/// How a submission found (or failed to find) its group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Canonical text matched exactly; the oracle was not consulted.
    Exact,
    /// The oracle picked an existing group's canonical text.
    Oracle,
    /// Nothing matched; a new group was founded.
    Created,
}

impl MatchOutcome {
    /// Whether the intent merged into an existing group.
    pub fn is_merge(&self) -> bool {
        !matches!(self, MatchOutcome::Created)
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::Exact => write!(f, "exact"),
            MatchOutcome::Oracle => write!(f, "oracle"),
            MatchOutcome::Created => write!(f, "created"),
        }
    }
}

/// Result of a single `create_intent` call.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    /// The stored intent, with its own events and group back-reference set.
    pub intent: Intent,
    /// The group as it stands right after this submission.
    pub group: GroupedIntent,
    pub outcome: MatchOutcome,
}

/// Store sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub intents: usize,
    pub groups: usize,
}
