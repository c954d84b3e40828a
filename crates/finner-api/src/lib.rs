//! FinNER API - REST server
//!
//! Thin HTTP adapter over the entity extractor: request validation,
//! status codes, and OpenAPI documentation.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use finner_core::AppConfig;
use finner_extractor::{builtin_corpus, GazetteerLabeler};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Financial Document NER API",
        description = "Extracts amounts, dates, and organizations from financial text."
    ),
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::extract::extract_handler,
        handlers::extract::batch_extract_handler,
    ),
    components(schemas(
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
        handlers::extract::ExtractRequest,
        handlers::extract::ExtractResponse,
        handlers::extract::EntitiesResponse,
        error::ApiError,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "extraction", description = "Entity extraction")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body_size = state.config.server.max_body_size;

    routes::api_routes()
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router backed by a gazetteer of the built-in corpus entities, so tests
/// run without a model server
pub fn create_router_for_testing() -> Router {
    let labeler = Arc::new(GazetteerLabeler::from_corpus(&builtin_corpus()));
    let state = Arc::new(AppState::with_labeler(AppConfig::default(), labeler));
    create_router(state)
}
