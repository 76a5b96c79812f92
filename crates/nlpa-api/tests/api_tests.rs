//! API Integration Tests
//!
//! The router is driven with `tower::ServiceExt::oneshot` against an
//! in-memory pipeline, so no parser or linker service is needed.
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use nlpa_api::{create_router, state::AppState};
use nlpa_core::{vocabulary, AppConfig, Document, Mmif};
use nlpa_pipeline::testing::{
    sample_doc, sample_resources, FailingPipeline, StaticLinker, StaticPipeline, SAMPLE_TEXT,
};
use nlpa_pipeline::Annotator;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn create_router_for_testing() -> Router {
    let annotator = Annotator::new(Arc::new(StaticPipeline::new(sample_doc())))
        .with_linker(Arc::new(StaticLinker::new(sample_resources())));
    create_router(Arc::new(AppState::new(AppConfig::default(), annotator)))
}

fn create_failing_router() -> Router {
    let annotator = Annotator::new(Arc::new(FailingPipeline));
    create_router(Arc::new(AppState::new(AppConfig::default(), annotator)))
}

fn sample_mmif() -> String {
    Mmif::new(vec![Document::text("m1", SAMPLE_TEXT)])
        .to_json(false)
        .unwrap()
}

fn annotate_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["total_requests"], 0);
    assert_eq!(json["pipeline"]["uncased"], false);
}

// =============================================================================
// Metadata Tests
// =============================================================================

#[tokio::test]
async fn test_app_metadata() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["name"], "Spacy NLP");
    assert_eq!(json["input"][0]["@type"], vocabulary::TEXT_DOCUMENT);
    assert_eq!(json["output"].as_array().unwrap().len(), 8);
}

// =============================================================================
// Annotate Tests
// =============================================================================

#[tokio::test]
async fn test_annotate_sample() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(annotate_request("/", sample_mmif()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let body = body_string(response).await;
    assert!(!body.contains('\n'));

    let mmif = Mmif::from_json(&body).unwrap();
    assert_eq!(mmif.views.len(), 1);

    let view = &mmif.views[0];
    let count = |at_type: &str| {
        view.annotations
            .iter()
            .filter(|a| a.at_type == at_type)
            .count()
    };
    assert_eq!(count(vocabulary::TOKEN), 5);
    assert_eq!(count(vocabulary::NAMED_ENTITY), 2);
    assert_eq!(count(vocabulary::GENERIC_RELATION), 1);

    let relation = view
        .annotations
        .iter()
        .find(|a| a.at_type == vocabulary::GENERIC_RELATION)
        .unwrap();
    assert_eq!(relation.get("rel_lemma"), Some(&Value::from("interview")));
}

#[tokio::test]
async fn test_annotate_pretty() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(annotate_request("/?pretty=true", sample_mmif()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("\n  "));
    assert!(Mmif::from_json(&body).is_ok());
}

#[tokio::test]
async fn test_annotate_counts_requests() {
    let state = Arc::new(AppState::new(
        AppConfig::default(),
        Annotator::new(Arc::new(StaticPipeline::new(sample_doc()))),
    ));
    let app = create_router(state.clone());

    app.clone()
        .oneshot(annotate_request("/", sample_mmif()))
        .await
        .unwrap();
    app.oneshot(annotate_request("/", sample_mmif()))
        .await
        .unwrap();

    assert_eq!(state.get_request_count(), 2);
}

#[tokio::test]
async fn test_annotate_invalid_mmif() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(annotate_request("/", "{not mmif".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_annotate_parser_failure() {
    let app = create_failing_router();

    let response = app
        .oneshot(annotate_request("/", sample_mmif()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["code"], "UPSTREAM_ERROR");
}
