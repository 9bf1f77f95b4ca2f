//! Integration tests for the Luma API.
//!
//! Each test builds its own state over fresh in-memory stores and drives the
//! router with `oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use luma_api::create_router;
use luma_api::error::ErrorBody;
use luma_api::handlers::{GroupedIntentsResponse, HealthResponse, IntentResponse};
use luma_api::state::AppState;
use luma_core::config::LumaConfig;
use luma_core::types::InteractionEvent;
use luma_engine::{IntentGroupingEngine, MatchOutcome};
use luma_oracle::{ExactMatchOracle, OracleError, SimilarityOracle};

// =============================================================================
// Helpers
// =============================================================================

/// Oracle that treats every pair as the same intent.
struct AgreeableOracle;

#[async_trait]
impl SimilarityOracle for AgreeableOracle {
    fn name(&self) -> &str {
        "agreeable"
    }

    async fn judge(&self, _a: &str, _b: &str) -> Result<bool, OracleError> {
        Ok(true)
    }

    async fn select(
        &self,
        _target: &str,
        candidates: &[String],
    ) -> Result<Option<String>, OracleError> {
        Ok(candidates.first().cloned())
    }
}

fn make_state_with(oracle: Arc<dyn SimilarityOracle>) -> AppState {
    AppState::new(LumaConfig::default(), IntentGroupingEngine::new(oracle))
}

fn make_state() -> AppState {
    make_state_with(Arc::new(ExactMatchOracle))
}

fn make_app() -> axum::Router {
    create_router(make_state())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

fn event_json(view_id: i64, resource: &str) -> Value {
    json!({
        "timestamp": "2024-01-01T00:00:00Z",
        "view_id": view_id,
        "view_resource_name": resource,
        "screen_name": "Home",
        "action_type": "CLICK"
    })
}

async fn record(app: &axum::Router, text: &str, events: Vec<Value>) -> IntentResponse {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/record_intent",
            &json!({ "intent_text": text, "interaction_events": events }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_happy_path() {
    let resp = make_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "luma-api");
    assert_eq!(health.oracle, "exact");
    assert_eq!(health.intents, 0);
    assert_eq!(health.grouped_intents, 0);
}

// =============================================================================
// POST /record_intent
// =============================================================================

#[tokio::test]
async fn test_record_intent_created() {
    let app = make_app();
    let intent = record(
        &app,
        "test intent",
        vec![event_json(1, "btn_a"), event_json(2, "btn_b")],
    )
    .await;

    assert_eq!(intent.intent_text, "test intent");
    assert_eq!(intent.interaction_events.len(), 2);
    assert!(intent.is_grouped);
    assert_eq!(intent.match_outcome, Some(MatchOutcome::Created));
}

#[tokio::test]
async fn test_record_intent_events_optional() {
    let app = make_app();
    let resp = app
        .oneshot(post_json("/record_intent", &json!({ "intent_text": "lights" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let intent: IntentResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(intent.interaction_events.is_empty());
}

#[tokio::test]
async fn test_record_intent_missing_text() {
    for body in [
        json!({ "interaction_events": [event_json(1, "btn")] }),
        json!({ "intent_text": "" }),
        json!({ "intent_text": "   " }),
    ] {
        let resp = make_app()
            .oneshot(post_json("/record_intent", &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let err: ErrorBody = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(err.error, "intent_text is required");
        assert_eq!(err.code, "bad_request");
    }
}

#[tokio::test]
async fn test_record_intent_malformed_json() {
    let req = Request::post("/record_intent")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = make_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let err: ErrorBody = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(err.code, "bad_request");
}

#[tokio::test]
async fn test_record_intent_accepts_partial_events() {
    let app = make_app();
    let body = json!({
        "intent_text": "test intent",
        "interaction_events": [
            { "event_type": "click", "timestamp": "2024-01-01T00:00:00Z" },
            { "event_type": "scroll", "timestamp": "2024-01-01T00:00:01Z" }
        ]
    });
    let resp = app
        .clone()
        .oneshot(post_json("/record_intent", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(created["intent_text"], "test intent");
    assert_eq!(created["interaction_events"].as_array().unwrap().len(), 2);

    let resp = app
        .oneshot(get("/get_interactions?intent_text=test%20intent"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let events: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(events[0]["event_type"], "click");
    assert_eq!(events[1]["event_type"], "scroll");
}

#[tokio::test]
async fn test_record_intent_rejects_event_without_timestamp() {
    let body = json!({
        "intent_text": "lights",
        "interaction_events": [{ "view_id": 1, "event_type": "click" }]
    });
    let resp = make_app()
        .oneshot(post_json("/record_intent", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_record_intent_body_limit() {
    let huge = "x".repeat(2 * 1024 * 1024);
    let resp = make_app()
        .oneshot(post_json("/record_intent", &json!({ "intent_text": huge })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// =============================================================================
// GET /get_interactions
// =============================================================================

#[tokio::test]
async fn test_get_interactions_found() {
    let app = make_app();
    let events = vec![event_json(123, "btn_lights"), event_json(124, "switch")];
    record(&app, "turn on lights", events.clone()).await;

    let resp = app
        .oneshot(get("/get_interactions?intent_text=turn%20on%20lights"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body, Value::Array(events));
}

#[tokio::test]
async fn test_get_interactions_not_found() {
    let resp = make_app()
        .oneshot(get("/get_interactions?intent_text=non-existent"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let err: ErrorBody = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(err.error, "No interactions found for this intent");
    assert_eq!(err.code, "not_found");
}

#[tokio::test]
async fn test_get_interactions_missing_param() {
    for uri in ["/get_interactions", "/get_interactions?intent_text="] {
        let resp = make_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let err: ErrorBody = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(err.error, "intent_text is required");
    }
}

#[tokio::test]
async fn test_get_interactions_accumulates_across_submissions() {
    let app = make_app();
    record(&app, "open settings", vec![event_json(1, "a")]).await;
    record(&app, "open settings", vec![event_json(2, "b")]).await;

    let resp = app
        .oneshot(get("/get_interactions?intent_text=open%20settings"))
        .await
        .unwrap();
    let events: Vec<InteractionEvent> =
        serde_json::from_slice(&body_bytes(resp).await).unwrap();
    let ids: Vec<i64> = events.iter().map(|e| e.view_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

// =============================================================================
// Read-only views
// =============================================================================

#[tokio::test]
async fn test_get_intent_and_not_found() {
    let app = make_app();
    let recorded = record(&app, "lights", vec![event_json(1, "btn")]).await;

    let resp = app
        .clone()
        .oneshot(get(&format!("/intents/{}", recorded.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let intent: IntentResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(intent.intent_text, "lights");
    assert_eq!(intent.grouped_intent_id, recorded.grouped_intent_id);
    assert!(intent.match_outcome.is_none());

    let resp = app.oneshot(get("/intents/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_grouped_intents_listing() {
    let app = make_app();
    record(&app, "open settings", vec![]).await;
    record(&app, "open settings", vec![]).await;
    record(&app, "close app", vec![]).await;

    let resp = app.clone().oneshot(get("/grouped_intents")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listing: GroupedIntentsResponse =
        serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(listing.total, 2);
    assert_eq!(listing.grouped_intents[0].intent_text, "open settings");
    assert_eq!(listing.grouped_intents[0].count, 2);
    assert_eq!(listing.grouped_intents[1].count, 1);

    let resp = app.clone().oneshot(get("/grouped_intents/2")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body["intent_text"], "close app");

    let resp = app.oneshot(get("/grouped_intents/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn test_lights_scenario_with_similar_wording() {
    let app = create_router(make_state_with(Arc::new(AgreeableOracle)));

    let first = record(&app, "turn on lights", vec![event_json(123, "btn_lights")]).await;
    let second = record(&app, "please turn the lights on", vec![]).await;

    assert_eq!(second.match_outcome, Some(MatchOutcome::Oracle));
    assert_eq!(second.grouped_intent_id, first.grouped_intent_id);
    assert!(second.interaction_events.is_empty());

    let resp = app
        .clone()
        .oneshot(get("/get_interactions?intent_text=turn%20lights%20on"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let events: Vec<InteractionEvent> =
        serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].view_id, 123);

    let resp = app.oneshot(get("/health")).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.intents, 2);
    assert_eq!(health.grouped_intents, 1);
}
