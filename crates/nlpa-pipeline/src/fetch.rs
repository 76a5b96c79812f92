//! Document text retrieval
//!
//! Reads the text of a document either from its inline value or from its
//! location: `file://` URIs and bare paths from disk, `http(s)://` over
//! the network.

use std::time::Duration;

use nlpa_core::{Document, NlpaError, Result, TextSource};
use reqwest::Client;

/// Resolves document text
#[derive(Clone, Default)]
pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher whose remote requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NlpaError::ConfigError(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Text of `doc`, or `None` when the document carries no text at all
    pub async fn read_text(&self, doc: &Document) -> Result<Option<String>> {
        match doc.text_source() {
            Some(TextSource::Inline(text)) => Ok(Some(text)),
            Some(TextSource::Location(location)) => self.fetch(&location).await.map(Some),
            None => Ok(None),
        }
    }

    /// Fetch the contents of a location
    pub async fn fetch(&self, location: &str) -> Result<String> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return self.fetch_http(location).await;
        }

        let path = location.strip_prefix("file://").unwrap_or(location);
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| NlpaError::Fetch {
                location: location.to_string(),
                message: e.to_string(),
            })
    }

    async fn fetch_http(&self, url: &str) -> Result<String> {
        let fetch_error = |message: String| NlpaError::Fetch {
            location: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}
