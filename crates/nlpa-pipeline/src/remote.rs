//! HTTP clients for the external NLP parser and entity linker
//!
//! The parser service takes `{"text", "model"}` and answers with a parsed
//! document. The linker is DBpedia Spotlight's `annotate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use nlpa_core::{LinkerConfig, NlpaError, ParserConfig, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ner::LinkedResource;
use crate::parsed::ParsedDoc;
use crate::{EntityLinker, NlpPipeline};

// ============================================================================
// Parser Service Client
// ============================================================================

/// Client for a remote parser service
pub struct RemoteParser {
    client: Client,
    url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
    model: &'a str,
}

impl RemoteParser {
    /// Create a new parser client
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            model: model.into(),
        }
    }

    /// Create from config, using the configured main model
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        Self::with_model(config, config.model.clone())
    }

    /// Create from config with an explicit model, e.g. the uncased NER model
    pub fn with_model(config: &ParserConfig, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NlpaError::ConfigError(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl NlpPipeline for RemoteParser {
    async fn parse(&self, text: &str) -> Result<ParsedDoc> {
        let request = ParseRequest {
            text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| NlpaError::Pipeline(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(NlpaError::Pipeline(format!(
                "Parser returned {status}: {error_text}"
            )));
        }

        let doc: ParsedDoc = response
            .json()
            .await
            .map_err(|e| NlpaError::Pipeline(format!("Failed to parse response: {e}")))?;

        tracing::debug!(
            model = %self.model,
            tokens = doc.tokens.len(),
            sentences = doc.sents.len(),
            "Parsed text"
        );
        Ok(doc)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// DBpedia Spotlight Client
// ============================================================================

/// Client for DBpedia Spotlight
pub struct SpotlightLinker {
    client: Client,
    url: String,
    confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct SpotlightResponse {
    #[serde(rename = "Resources", default)]
    resources: Vec<LinkedResource>,
}

impl SpotlightLinker {
    /// Create a new Spotlight client
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            confidence: None,
        }
    }

    /// Create from config
    pub fn from_config(config: &LinkerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NlpaError::ConfigError(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            confidence: config.confidence,
        })
    }

    /// Set the disambiguation confidence threshold
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }
}

#[async_trait]
impl EntityLinker for SpotlightLinker {
    async fn link(&self, text: &str) -> Result<Vec<LinkedResource>> {
        let mut form = vec![("text", text.to_string())];
        if let Some(confidence) = self.confidence {
            form.push(("confidence", confidence.to_string()));
        }

        let response = self
            .client
            .post(&self.url)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| NlpaError::Linker(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(NlpaError::Linker(format!(
                "Spotlight returned {status}: {error_text}"
            )));
        }

        let result: SpotlightResponse = response
            .json()
            .await
            .map_err(|e| NlpaError::Linker(format!("Failed to parse response: {e}")))?;

        tracing::debug!(resources = result.resources.len(), "Linked entities");
        Ok(result.resources)
    }
}

// ============================================================================
// Tests
// ============================================================================
