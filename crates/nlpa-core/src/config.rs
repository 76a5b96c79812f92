//! NLPA Configuration Management
//!
//! Handles configuration from environment variables, config files,
//! and command-line arguments with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// NLP parser service
    pub parser: ParserConfig,

    /// Entity linking service
    pub linker: LinkerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
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

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            self.server.port = parse_value("API_PORT", &port)?;
        }

        // Parser
        if let Ok(url) = std::env::var("PARSER_URL") {
            self.parser.url = url;
        }
        if let Ok(model) = std::env::var("PARSER_MODEL") {
            self.parser.model = model;
        }
        if let Ok(model) = std::env::var("UNCASED_MODEL") {
            self.parser.uncased_model = Some(model);
        }

        // Linker
        if let Ok(url) = std::env::var("LINKER_URL") {
            self.linker.url = url;
        }
        if let Ok(enabled) = std::env::var("LINKER_ENABLED") {
            self.linker.enabled = parse_value("LINKER_ENABLED", &enabled)?;
        }
        if let Ok(confidence) = std::env::var("LINKER_CONFIDENCE") {
            self.linker.confidence = Some(parse_value("LINKER_CONFIDENCE", &confidence)?);
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            self.logging.json_format = parse_value("LOG_JSON", &json)?;
        }

        Ok(self)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("parser.url".to_string()));
        }
        if self.linker.enabled && self.linker.url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("linker.url".to_string()));
        }
        if let Some(confidence) = self.linker.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ConfigError::InvalidValue {
                    key: "linker.confidence".to_string(),
                    value: confidence.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
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
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// NLP parser service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Endpoint that accepts `{"text", "model"}` and returns a parsed document
    pub url: String,

    /// Model used for the main parse
    pub model: String,

    /// NER model trained on lowercased text, used for truecasing
    pub uncased_model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8090/parse".to_string(),
            model: "en_core_web_sm".to_string(),
            uncased_model: None,
            timeout_secs: 60,
        }
    }
}

/// Name used for the uncased model when `--uncased` is given without one
pub const DEFAULT_UNCASED_MODEL: &str = "ner-uncased";

/// Entity linker (DBpedia Spotlight) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Use the linker for named entities; otherwise the parser's NER is used
    pub enabled: bool,

    /// Spotlight `annotate` endpoint
    pub url: String,

    /// Spotlight disambiguation confidence (0.0 - 1.0)
    pub confidence: Option<f32>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://api.dbpedia-spotlight.org/en/annotate".to_string(),
            confidence: None,
            timeout_secs: 60,
        }
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

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
