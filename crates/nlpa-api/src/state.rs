//! Application state management
//!
//! Author: hephaex@gmail.com

use nlpa_core::AppConfig;
use nlpa_pipeline::Annotator;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Pipeline used for every annotate request
    pub annotator: Arc<Annotator>,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, annotator: Annotator) -> Self {
        Self {
            config,
            annotator: Arc::new(annotator),
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Build state with the remote pipeline from `config`
    pub fn from_config(config: AppConfig, uncased: bool) -> nlpa_core::Result<Self> {
        let annotator = Annotator::from_config(&config, uncased)?;
        Ok(Self::new(config, annotator))
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
