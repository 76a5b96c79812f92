//! NLPA Core - Shared models, traits, and error types
//!
//! This crate defines the abstractions used throughout the service:
//! - MMIF document model (documents, views, annotations)
//! - Annotation vocabulary URIs
//! - Per-batch annotation identifier generator
//! - Common error types
//! - Configuration management

pub mod config;
pub mod identifiers;
pub mod mmif;
pub mod vocabulary;

pub use config::{AppConfig, ConfigError, LinkerConfig, LoggingConfig, ParserConfig, ServerConfig};
pub use identifiers::Identifiers;
pub use mmif::{Annotation, Document, Mmif, TextSource, View};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for annotation operations
#[derive(Error, Debug)]
pub enum NlpaError {
    #[error("Invalid MMIF: {0}")]
    InvalidMmif(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Entity linker error: {0}")]
    Linker(String),

    #[error("Failed to fetch document {location}: {message}")]
    Fetch { location: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NlpaError {
    /// Whether the failure came from an external NLP or linking service
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Pipeline(_) | Self::Linker(_))
    }
}

impl From<ConfigError> for NlpaError {
    fn from(err: ConfigError) -> Self {
        NlpaError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NlpaError>;
