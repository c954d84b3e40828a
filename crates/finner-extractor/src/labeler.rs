//! Sequence-labeler implementations
//!
//! Provides a client for token-classification inference endpoints and a
//! deterministic in-process gazetteer for tests and reproducible scoring.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use finner_core::{
    EntityKind, FinnerError, LabeledSpan, ModelConfig, ModelProvider, Result, SequenceLabeler,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::corpus::LabeledExample;

// ============================================================================
// Inference API Client
// ============================================================================

/// Client for a hosted or self-hosted token-classification model
pub struct HuggingFaceLabeler {
    client: Client,
    url: String,
    model: String,
    api_token: Option<String>,
    aggregation_strategy: String,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
}

#[derive(Debug, Serialize)]
struct InferenceParameters<'a> {
    aggregation_strategy: &'a str,
}

/// Token-classification payloads: a span list, or an error object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Spans(Vec<LabeledSpan>),
    Error { error: String },
}

/// Parse a token-classification response body into spans, in response order
pub fn parse_token_classification(body: &str) -> Result<Vec<LabeledSpan>> {
    let response: InferenceResponse = serde_json::from_str(body)
        .map_err(|e| FinnerError::ModelError(format!("Failed to parse model response: {e}")))?;

    match response {
        InferenceResponse::Spans(spans) => Ok(spans),
        InferenceResponse::Error { error } => Err(FinnerError::ModelError(error)),
    }
}

impl HuggingFaceLabeler {
    /// Create a client for a model on the hosted inference API
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            url: format!("{}/models/{}", base_url.trim_end_matches('/'), model),
            model,
            api_token: None,
            aggregation_strategy: "simple".to_string(),
        }
    }

    /// Create from config
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FinnerError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        let url = match config.provider {
            ModelProvider::HuggingFace => format!(
                "{}/models/{}",
                config.endpoint_url.trim_end_matches('/'),
                config.model
            ),
            ModelProvider::Endpoint => config.endpoint_url.clone(),
        };

        Ok(Self {
            client,
            url,
            model: config.model.clone(),
            api_token: config.api_token.clone(),
            aggregation_strategy: config.aggregation_strategy.clone(),
        })
    }

    /// URL requests are posted to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SequenceLabeler for HuggingFaceLabeler {
    #[instrument(skip(self, text), fields(model = %self.model, chars = text.chars().count()))]
    async fn label(&self, text: &str) -> Result<Vec<LabeledSpan>> {
        let request = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                aggregation_strategy: &self.aggregation_strategy,
            },
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FinnerError::ModelError(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FinnerError::ModelError(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(FinnerError::ModelError(format!(
                "Inference API error ({status}): {body}"
            )));
        }

        parse_token_classification(&body)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Gazetteer Labeler
// ============================================================================

/// Labels every occurrence of a fixed set of terms.
///
/// Occurrences are reported in document order; at a shared start the longer
/// term wins, and occurrences overlapping an earlier one are skipped.
#[derive(Debug, Clone, Default)]
pub struct GazetteerLabeler {
    terms: Vec<(String, String)>,
}

impl GazetteerLabeler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term with its model label
    pub fn with_term(mut self, term: impl Into<String>, label: impl Into<String>) -> Self {
        self.add_term(term, label);
        self
    }

    pub fn add_term(&mut self, term: impl Into<String>, label: impl Into<String>) {
        let term = term.into();
        if term.is_empty() {
            return;
        }
        let label = label.into();
        if !self.terms.iter().any(|(t, l)| *t == term && *l == label) {
            self.terms.push((term, label));
        }
    }

    /// Labeler that recognizes exactly the expected organizations (`ORG`)
    /// and dates (`DATE`) of a corpus
    pub fn from_corpus(examples: &[LabeledExample]) -> Self {
        let mut gazetteer = Self::new();
        for example in examples {
            for org in example.expected_for(EntityKind::Organizations) {
                gazetteer.add_term(org.trim(), "ORG");
            }
            for date in example.expected_for(EntityKind::Dates) {
                gazetteer.add_term(date.trim(), "DATE");
            }
        }
        gazetteer
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn find_spans(&self, text: &str) -> Vec<LabeledSpan> {
        let mut hits: Vec<(usize, usize, &str)> = Vec::new();
        for (term, label) in &self.terms {
            for (start, matched) in text.match_indices(term.as_str()) {
                hits.push((start, start + matched.len(), label.as_str()));
            }
        }

        // Leftmost first, longest first at the same start
        hits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut spans = Vec::new();
        let mut covered_until = 0;
        for (start, end, label) in hits {
            if start < covered_until {
                continue;
            }
            spans.push(LabeledSpan::new(&text[start..end], label));
            covered_until = end;
        }
        spans
    }
}

#[async_trait]
impl SequenceLabeler for GazetteerLabeler {
    async fn label(&self, text: &str) -> Result<Vec<LabeledSpan>> {
        Ok(self.find_spans(text))
    }

    fn name(&self) -> &str {
        "gazetteer"
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create the configured model client
pub fn create_labeler(config: &ModelConfig) -> Result<Arc<dyn SequenceLabeler>> {
    Ok(Arc::new(HuggingFaceLabeler::from_config(config)?))
}

// ============================================================================
// Tests
// ============================================================================
