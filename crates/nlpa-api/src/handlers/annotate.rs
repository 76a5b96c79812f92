//! MMIF annotation handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use nlpa_core::Mmif;
use nlpa_pipeline::AppMetadata;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

/// Query parameters for annotate requests
#[derive(Debug, Default, Deserialize)]
pub struct AnnotateParams {
    /// Pretty-print the returned MMIF
    #[serde(default)]
    pub pretty: bool,
}

/// Describe this app
pub async fn app_metadata(State(state): State<Arc<AppState>>) -> Json<AppMetadata> {
    Json(state.annotator.metadata().clone())
}

/// Annotate the posted MMIF and return it with the new views
pub async fn annotate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnnotateParams>,
    body: String,
) -> Result<Response, AppError> {
    state.increment_requests();
    let started = Instant::now();

    let mmif = Mmif::from_json(&body)?;
    let views_before = mmif.views.len();

    let annotated = state.annotator.annotate(mmif).await?;
    let output = annotated.to_json(params.pretty)?;

    tracing::info!(
        new_views = annotated.views.len() - views_before,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Annotate request completed"
    );

    Ok(([(header::CONTENT_TYPE, "application/json")], output).into_response())
}
