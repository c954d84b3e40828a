//! FinNER Configuration Management
//!
//! Handles configuration from environment variables and TOML config
//! files with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Sequence-labeling model configuration
    pub model: ModelConfig,

    /// Corpus evaluation configuration
    pub evaluation: EvaluationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (defaults for missing keys)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().apply_lookup(lookup)
    }

    /// Overwrite every field whose key is present in `lookup`
    pub fn apply_lookup<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self;

        // Server
        if let Some(host) = lookup("API_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            config.server.port = parse_value("API_PORT", port)?;
        }
        if let Some(size) = lookup("MAX_BATCH_SIZE") {
            config.server.max_batch_size = parse_value("MAX_BATCH_SIZE", size)?;
        }

        // Model
        if let Some(provider) = lookup("NER_PROVIDER") {
            config.model.provider = provider.parse()?;
        }
        if let Some(url) = lookup("NER_ENDPOINT_URL") {
            config.model.endpoint_url = url;
        }
        if let Some(model) = lookup("NER_MODEL") {
            config.model.model = model;
        }
        if let Some(token) = lookup("HF_API_TOKEN") {
            config.model.api_token = Some(token);
        }
        if let Some(secs) = lookup("NER_TIMEOUT_SECS") {
            config.model.timeout_secs = parse_value("NER_TIMEOUT_SECS", secs)?;
        }

        // Evaluation
        if let Some(n) = lookup("EVAL_CONCURRENCY") {
            config.evaluation.concurrency = parse_value("EVAL_CONCURRENCY", n)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            config.logging.json_format = parse_value("LOG_JSON", json)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Apply environment variables on top (a set variable always wins)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.apply_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Maximum number of documents in one batch request
    pub max_batch_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: 1024 * 1024, // 1MB
            max_batch_size: 64,
        }
    }
}

/// Sequence-labeling model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// How the model is reached
    pub provider: ModelProvider,

    /// Inference API base URL (or full endpoint URL for `endpoint`)
    pub endpoint_url: String,

    /// Model identifier
    pub model: String,

    /// Bearer token for the inference API
    pub api_token: Option<String>,

    /// Sub-word aggregation strategy requested from the model
    pub aggregation_strategy: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::HuggingFace,
            endpoint_url: "https://api-inference.huggingface.co".to_string(),
            model: "dslim/bert-base-NER".to_string(),
            api_token: None,
            aggregation_strategy: "simple".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Hosted inference API, `{endpoint_url}/models/{model}`
    HuggingFace,
    /// Self-hosted token-classification endpoint, `endpoint_url` as is
    Endpoint,
}

impl std::str::FromStr for ModelProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "endpoint" => Ok(Self::Endpoint),
            _ => Err(ConfigError::InvalidValue {
                key: "NER_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Corpus evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Documents labeled concurrently while scoring
    pub concurrency: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
