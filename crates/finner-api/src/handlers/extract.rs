//! Extraction handlers

use crate::error::{ApiError, AppError};
use crate::state::AppState;
use axum::{extract::State, Json};
use finner_core::ExtractionResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// A document to process
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractRequest {
    /// Raw document text
    #[schema(
        example = "Goldman Sachs reported Q2 revenue of $12.4 billion on July 15, 2024. The deal with Morgan Stanley closes on August 1, 2024."
    )]
    pub text: String,
}

/// Entities found in one document
#[derive(Debug, Serialize, ToSchema)]
pub struct EntitiesResponse {
    #[schema(example = json!(["$12.4 billion"]))]
    pub amounts: Vec<String>,
    #[schema(example = json!(["July 15, 2024", "August 1, 2024"]))]
    pub dates: Vec<String>,
    #[schema(example = json!(["Goldman Sachs", "Morgan Stanley"]))]
    pub organizations: Vec<String>,
}

impl From<ExtractionResult> for EntitiesResponse {
    fn from(result: ExtractionResult) -> Self {
        Self {
            amounts: result.amounts,
            dates: result.dates,
            organizations: result.organizations,
        }
    }
}

/// Single-document extraction response
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractResponse {
    pub amounts: Vec<String>,
    pub dates: Vec<String>,
    pub organizations: Vec<String>,
    /// Number of characters in the submitted text
    pub char_count: usize,
}

/// Extract amounts, dates, and organizations from one document
#[utoipa::path(
    post,
    path = "/extract",
    tag = "extraction",
    request_body = ExtractRequest,
    responses(
        (status = 200, description = "Extracted entities", body = ExtractResponse),
        (status = 422, description = "Empty text", body = ApiError),
        (status = 502, description = "Sequence-labeling model failed", body = ApiError)
    )
)]
pub async fn extract_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    state.increment_requests();

    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text field cannot be empty".to_string()));
    }

    let result = state.extractor.extract(&req.text).await?;

    Ok(Json(ExtractResponse {
        amounts: result.amounts,
        dates: result.dates,
        organizations: result.organizations,
        char_count: req.text.chars().count(),
    }))
}

/// Process multiple documents in one call
#[utoipa::path(
    post,
    path = "/batch_extract",
    tag = "extraction",
    request_body(content = [ExtractRequest], description = "Documents to process"),
    responses(
        (status = 200, description = "Entities per document, in request order", body = [EntitiesResponse]),
        (status = 413, description = "Too many documents", body = ApiError),
        (status = 502, description = "Sequence-labeling model failed", body = ApiError)
    )
)]
pub async fn batch_extract_handler(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<ExtractRequest>>,
) -> Result<Json<Vec<EntitiesResponse>>, AppError> {
    state.increment_requests();

    let max = state.config.server.max_batch_size;
    if requests.len() > max {
        return Err(AppError::PayloadTooLarge(format!(
            "batch of {} documents exceeds the limit of {max}",
            requests.len()
        )));
    }

    let texts: Vec<String> = requests.into_iter().map(|r| r.text).collect();
    let results = state.extractor.extract_batch(&texts).await?;

    Ok(Json(results.into_iter().map(EntitiesResponse::from).collect()))
}
