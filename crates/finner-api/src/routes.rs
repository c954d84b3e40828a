//! API route definitions

use crate::handlers::{extract, health};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/extract", post(extract::extract_handler))
        .route("/batch_extract", post(extract::batch_extract_handler))
}
