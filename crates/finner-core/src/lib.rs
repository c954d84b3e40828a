//! FinNER Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout FinNER:
//! - Entity kinds and extraction results
//! - Labeled spans produced by a sequence-labeling model
//! - The `SequenceLabeler` collaborator trait
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, EvaluationConfig, LoggingConfig, ModelConfig, ModelProvider,
    ServerConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for FinNER operations
#[derive(Error, Debug)]
pub enum FinnerError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Corpus error: {0}")]
    CorpusError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for FinnerError {
    fn from(err: ConfigError) -> Self {
        FinnerError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FinnerError>;

// ============================================================================
// Entity Kinds
// ============================================================================

/// The three entity categories extracted from financial text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Amounts,
    Dates,
    Organizations,
}

impl EntityKind {
    /// All kinds, in reporting order
    pub const ALL: [EntityKind; 3] = [Self::Amounts, Self::Dates, Self::Organizations];

    /// Key used in corpora and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amounts => "amounts",
            Self::Dates => "dates",
            Self::Organizations => "organizations",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = FinnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "amounts" => Ok(Self::Amounts),
            "dates" => Ok(Self::Dates),
            "organizations" => Ok(Self::Organizations),
            other => Err(FinnerError::ValidationError(format!(
                "unknown entity kind: {other}"
            ))),
        }
    }
}

// ============================================================================
// Labeled Spans
// ============================================================================

/// A piece of surface text tagged by the sequence-labeling model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSpan {
    /// Surface string covered by the span
    #[serde(alias = "word")]
    pub text: String,

    /// Model tag (`ORG`, `DATE`, `TIME`, `PER`, ...)
    #[serde(alias = "entity_group", alias = "entity")]
    pub label: String,

    /// Model confidence, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl LabeledSpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Where this span goes during fusion
    pub fn route(&self) -> SpanRoute {
        match self.label.as_str() {
            "ORG" => SpanRoute::Organization,
            "DATE" | "TIME" => SpanRoute::Date,
            _ => SpanRoute::Ignored,
        }
    }
}

/// Destination of a model span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanRoute {
    Organization,
    Date,
    Ignored,
}

// ============================================================================
// Extraction Result
// ============================================================================

/// Deduplicated, ordered entity lists for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub amounts: Vec<String>,
    pub dates: Vec<String>,
    pub organizations: Vec<String>,
}

impl ExtractionResult {
    /// Entities of one kind
    pub fn get(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Amounts => &self.amounts,
            EntityKind::Dates => &self.dates,
            EntityKind::Organizations => &self.organizations,
        }
    }

    /// Total number of entities across all kinds
    pub fn total(&self) -> usize {
        self.amounts.len() + self.dates.len() + self.organizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

// ============================================================================
// Traits
// ============================================================================

/// A pretrained sequence-labeling model.
///
/// Given raw text, returns the labeled spans in document order. The
/// returned vector is consumed once by the caller; implementations make
/// no promise that two calls on the same text return the same spans.
#[async_trait::async_trait]
pub trait SequenceLabeler: Send + Sync {
    /// Label a document
    async fn label(&self, text: &str) -> Result<Vec<LabeledSpan>>;

    /// Name of the labeler for identification
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
