//! Route handler functions for all API endpoints.
//!
//! Each handler extracts query/path/body parameters via axum extractors,
//! calls the grouping engine, and returns JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use luma_core::types::{GroupId, GroupedIntent, Intent, IntentId, InteractionEvent};
use luma_engine::{MatchOutcome, Submission};

use crate::error::{ApiError, INTENT_TEXT_REQUIRED, NO_INTERACTIONS_FOUND};
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

/// Body of `POST /record_intent`. Both fields are optional on the wire so a
/// missing text is reported as a 400 with the usual error body.
#[derive(Debug, Default, Deserialize)]
pub struct RecordIntentRequest {
    #[serde(default)]
    pub intent_text: Option<String>,
    #[serde(default)]
    pub interaction_events: Option<Vec<InteractionEvent>>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionsParams {
    pub intent_text: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    pub oracle: String,
    pub intents: usize,
    pub grouped_intents: usize,
}

/// A stored intent as returned by `POST /record_intent` and `GET /intents/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct IntentResponse {
    pub id: IntentId,
    pub intent_text: String,
    pub interaction_events: Vec<InteractionEvent>,
    pub created_at: DateTime<Utc>,
    pub is_grouped: bool,
    pub grouped_intent_id: Option<GroupId>,
    /// How the intent found its group. Only set on the recording response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_outcome: Option<MatchOutcome>,
}

impl From<Intent> for IntentResponse {
    fn from(intent: Intent) -> Self {
        Self {
            is_grouped: intent.is_grouped(),
            id: intent.id,
            intent_text: intent.intent_text,
            interaction_events: intent.interaction_events,
            created_at: intent.created_at,
            grouped_intent_id: intent.grouped_intent_id,
            match_outcome: None,
        }
    }
}

impl From<Submission> for IntentResponse {
    fn from(submission: Submission) -> Self {
        Self {
            match_outcome: Some(submission.outcome),
            ..submission.intent.into()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupedIntentsResponse {
    pub grouped_intents: Vec<GroupedIntent>,
    pub total: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health - liveness plus store sizes.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let stats = state.engine.stats()?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        service: "luma-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        oracle: state.engine.oracle_name().to_string(),
        intents: stats.intents,
        grouped_intents: stats.groups,
    }))
}

/// POST /record_intent - store an intent and fold it into a group.
pub async fn record_intent(
    State(state): State<AppState>,
    payload: Result<Json<RecordIntentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IntentResponse>), ApiError> {
    let Json(body) = payload?;

    let intent_text = required_text(body.intent_text)?;
    let events = body.interaction_events.unwrap_or_default();

    let submission = state.engine.submit(&intent_text, events).await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// GET /get_interactions?intent_text=... - aggregated events of the
/// matching group.
pub async fn get_interactions(
    State(state): State<AppState>,
    Query(params): Query<InteractionsParams>,
) -> Result<Json<Vec<InteractionEvent>>, ApiError> {
    let intent_text = required_text(params.intent_text)?;

    match state.engine.get_interactions(&intent_text).await? {
        Some(events) => Ok(Json(events)),
        None => {
            debug!(intent_text = %intent_text, "No group matched lookup");
            Err(ApiError::NotFound(NO_INTERACTIONS_FOUND.to_string()))
        }
    }
}

/// GET /intents/{id}
pub async fn get_intent(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<IntentResponse>, ApiError> {
    state
        .engine
        .get_intent(IntentId(id))?
        .map(|intent| Json(intent.into()))
        .ok_or_else(|| ApiError::NotFound(format!("Intent {} not found", id)))
}

/// GET /grouped_intents - all groups in creation order.
pub async fn list_grouped_intents(
    State(state): State<AppState>,
) -> Result<Json<GroupedIntentsResponse>, ApiError> {
    let grouped_intents = state.engine.list_grouped_intents()?;
    Ok(Json(GroupedIntentsResponse {
        total: grouped_intents.len(),
        grouped_intents,
    }))
}

/// GET /grouped_intents/{id}
pub async fn get_grouped_intent(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<GroupedIntent>, ApiError> {
    state
        .engine
        .get_grouped_intent(GroupId(id))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Grouped intent {} not found", id)))
}

/// Blank and missing text are the same error.
fn required_text(text: Option<String>) -> Result<String, ApiError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::BadRequest(INTENT_TEXT_REQUIRED.to_string())),
    }
}
