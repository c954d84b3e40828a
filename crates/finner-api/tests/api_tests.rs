//! API Integration Tests
//!
//! All tests run against in-process labelers; no model server is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use finner_api::{create_router, create_router_for_testing, state::AppState};
use finner_core::{AppConfig, FinnerError, LabeledSpan, SequenceLabeler};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, json)
}

struct UnavailableLabeler;

#[async_trait]
impl SequenceLabeler for UnavailableLabeler {
    async fn label(&self, _text: &str) -> finner_core::Result<Vec<LabeledSpan>> {
        Err(FinnerError::ModelError("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let (status, json) = send(app, create_json_request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_check() {
    let app = create_router_for_testing();

    let (status, json) = send(app, create_json_request("GET", "/ready", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["labeler"], "gazetteer");
    assert!(json["uptime_seconds"].is_number());
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_router_for_testing();

    let (status, json) = send(app, create_json_request("GET", "/api-docs/openapi.json", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/extract"].is_object());
    assert!(json["paths"]["/batch_extract"].is_object());
}

// =============================================================================
// Extraction Tests
// =============================================================================

#[tokio::test]
async fn test_extract_success() {
    let app = create_router_for_testing();

    let request = create_json_request(
        "POST",
        "/extract",
        Some(json!({
            "text": "Microsoft acquired Activision Blizzard for $68.7 billion, closing December 31, 2023."
        })),
    );
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["amounts"], json!(["$68.7 billion"]));
    assert_eq!(json["dates"], json!(["December 31, 2023"]));
    assert_eq!(json["organizations"], json!(["Microsoft", "Activision Blizzard"]));
    assert_eq!(json["char_count"], 84);
}

#[tokio::test]
async fn test_extract_char_count_uses_characters() {
    let app = create_router_for_testing();

    let request = create_json_request("POST", "/extract", Some(json!({"text": "€5 ≈ $5"})));
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["char_count"], 7);
    assert_eq!(json["amounts"], json!(["$5"]));
}

#[tokio::test]
async fn test_extract_rejects_blank_text() {
    for text in ["", "   \n\t"] {
        let app = create_router_for_testing();

        let request = create_json_request("POST", "/extract", Some(json!({ "text": text })));
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "text field cannot be empty");
    }
}

#[tokio::test]
async fn test_extract_missing_text_field() {
    let app = create_router_for_testing();

    let request = create_json_request("POST", "/extract", Some(json!({"body": "hello"})));
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_extract_model_failure_is_bad_gateway() {
    let state = Arc::new(AppState::with_labeler(
        AppConfig::default(),
        Arc::new(UnavailableLabeler),
    ));
    let app = create_router(state);

    let request = create_json_request(
        "POST",
        "/extract",
        Some(json!({"text": "Citigroup announced a $1.5 billion buyback."})),
    );
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "MODEL_UNAVAILABLE");
    assert_eq!(json["details"], "connection refused");
}

// =============================================================================
// Batch Extraction Tests
// =============================================================================

#[tokio::test]
async fn test_batch_extract_preserves_order() {
    let app = create_router_for_testing();

    let request = create_json_request(
        "POST",
        "/batch_extract",
        Some(json!([
            {"text": "On 06/15/2024, Citigroup announced a $1.5 billion share buyback program."},
            {"text": ""},
            {"text": "Wells Fargo reported net income of $4.9 billion for the quarter ending March 31, 2024."}
        ])),
    );
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 3);

    assert_eq!(items[0]["organizations"], json!(["Citigroup"]));
    assert_eq!(items[0]["dates"], json!(["06/15/2024"]));
    assert_eq!(items[1]["amounts"], json!([]));
    assert_eq!(items[2]["organizations"], json!(["Wells Fargo"]));
    assert_eq!(items[2]["amounts"], json!(["$4.9 billion"]));
    assert!(items[0].get("char_count").is_none());
}

#[tokio::test]
async fn test_batch_extract_too_many_documents() {
    let mut config = AppConfig::default();
    config.server.max_batch_size = 2;
    let state = Arc::new(AppState::with_labeler(
        config,
        Arc::new(finner_extractor::GazetteerLabeler::new()),
    ));
    let app = create_router(state);

    let docs: Vec<Value> = (0..3).map(|i| json!({"text": format!("${i} million")})).collect();
    let request = create_json_request("POST", "/batch_extract", Some(Value::Array(docs)));
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");
}
