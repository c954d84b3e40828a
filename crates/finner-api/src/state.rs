//! Application state management

use finner_core::{AppConfig, Result, SequenceLabeler};
use finner_extractor::{create_labeler, SpanExtractor};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Entity extractor around the configured model
    pub extractor: SpanExtractor,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create state with the model client described by `config`
    pub fn new(config: AppConfig) -> Result<Self> {
        let labeler = create_labeler(&config.model)?;
        Ok(Self::with_labeler(config, labeler))
    }

    /// Create state around an explicit labeler
    pub fn with_labeler(config: AppConfig, labeler: Arc<dyn SequenceLabeler>) -> Self {
        Self {
            config,
            extractor: SpanExtractor::new(labeler),
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
