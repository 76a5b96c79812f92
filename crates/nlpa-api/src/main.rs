//! NLPA API Server
//!
//! Serves MMIF annotation over HTTP.
//!
//! Author: hephaex@gmail.com

use nlpa_api::{logging, serve, state::AppState};
use nlpa_core::config::AppConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    logging::init(&config.logging);

    let uncased = config.parser.uncased_model.is_some();
    let state = Arc::new(AppState::from_config(config, uncased)?);

    serve(state).await
}
