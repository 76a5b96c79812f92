//! Health check handlers
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub pipeline: PipelineInfo,
}

#[derive(Serialize)]
pub struct PipelineInfo {
    pub parser_model: String,
    pub entity_linking: bool,
    pub uncased: bool,
}

/// Liveness probe - basic health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_secs(),
        total_requests: state.get_request_count(),
        pipeline: PipelineInfo {
            parser_model: state.config.parser.model.clone(),
            entity_linking: state.config.linker.enabled,
            uncased: state.annotator.is_uncased(),
        },
    })
}
