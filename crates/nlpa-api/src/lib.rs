//! NLPA API - HTTP server
//!
//! `GET /` describes the app, `POST /` annotates a MMIF document and
//! `GET /health` reports liveness.

pub mod error;
pub mod handlers;
pub mod logging;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use handlers::{annotate, health};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_body_size;

    Router::new()
        .route("/", get(annotate::app_metadata).post(annotate::annotate))
        .route("/health", get(health::health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("NLPA API Server starting on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
