//! HTTP-contract tests for the lemma service endpoints.
//!
//! The model handle is substituted with in-memory doubles so the full
//! request path (validation, invocation, serialization) is exercised
//! without any model files on disk.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use lemma_core::{Annotation, Annotator, EngineError, Token};
use lemma_server::service::{router, AppState};

const MODEL_NAME: &str = "en-core-sm";

// ── Model doubles ──────────────────────────────────────────────

/// Whitespace tokenizer standing in for a loaded model. Counts invocations
/// so tests can assert that validation short-circuits before the model.
struct WhitespaceModel {
    calls: AtomicUsize,
}

impl WhitespaceModel {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl Annotator for WhitespaceModel {
    fn annotate(&self, text: &str) -> lemma_core::Result<Annotation> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut tokens = Vec::new();
        let mut word = String::new();
        let mut start = 0;
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                if !word.is_empty() {
                    tokens.push(mock_token(&word, start));
                    word.clear();
                }
            } else {
                if word.is_empty() {
                    start = i;
                }
                word.push(ch);
            }
        }
        if !word.is_empty() {
            tokens.push(mock_token(&word, start));
        }

        Ok(Annotation {
            language: "en".to_string(),
            tokens,
        })
    }
}

fn mock_token(text: &str, start: usize) -> Token {
    Token {
        text: text.to_string(),
        lemma: text.to_lowercase(),
        pos: "X".to_string(),
        start,
    }
}

/// Model whose inference always fails.
struct FailingModel;

impl Annotator for FailingModel {
    fn annotate(&self, _text: &str) -> lemma_core::Result<Annotation> {
        Err(EngineError::Inference("tagger exploded".to_string()))
    }
}

// ── Test harness ───────────────────────────────────────────────

fn test_app(model: Arc<dyn Annotator>) -> axum::Router {
    router(AppState::new(model, MODEL_NAME))
}

fn whitespace_app() -> axum::Router {
    test_app(Arc::new(WhitespaceModel::new()))
}

async fn get(app: axum::Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_body(app: axum::Router, path: &str, body: String) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, bytes)
}

async fn post_json(app: axum::Router, path: &str, body: &Value) -> (StatusCode, Value) {
    let (status, bytes) = post_body(app, path, body.to_string()).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Character slice of `s`, Python-style `s[start:end]`.
fn char_slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end - start).collect()
}

// ── /health ────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ready_and_model() {
    let (status, body) = get(whitespace_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "model": MODEL_NAME}));
}

// ── /lemmatize ─────────────────────────────────────────────────

#[tokio::test]
async fn tokens_match_offsets_in_document_order() {
    let input = "The cats are running.";
    let (status, body) =
        post_json(whitespace_app(), "/lemmatize", &json!({ "text": input })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "en");
    assert_eq!(body["model"], MODEL_NAME);

    let tokens = body["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 4);

    let mut last_start = 0;
    for token in tokens {
        let start = token["start"].as_u64().unwrap() as usize;
        let end = token["end"].as_u64().unwrap() as usize;
        let text = token["text"].as_str().unwrap();

        assert_eq!(text, char_slice(input, start, end));
        assert_eq!(end, start + text.chars().count());
        assert!(start >= last_start, "tokens out of document order");
        last_start = start;
    }

    assert_eq!(tokens[1]["text"], "cats");
    assert_eq!(tokens[1]["lemma"], "cats");
    assert_eq!(tokens[1]["pos"], "X");
}

#[tokio::test]
async fn empty_text_yields_no_tokens() {
    let (status, body) = post_json(whitespace_app(), "/lemmatize", &json!({"text": ""})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokens"], json!([]));
    assert_eq!(body["model"], MODEL_NAME);
}

#[tokio::test]
async fn missing_text_defaults_to_empty() {
    let (status, body) = post_json(whitespace_app(), "/lemmatize", &json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokens"], json!([]));
}

#[tokio::test]
async fn text_at_limit_is_accepted() {
    let input = "a".repeat(20_000);
    let (status, body) =
        post_json(whitespace_app(), "/lemmatize", &json!({ "text": input })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokens"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_text_is_rejected_before_model_invocation() {
    let model = Arc::new(WhitespaceModel::new());
    let app = test_app(model.clone());

    let input = "a".repeat(20_001);
    let (status, bytes) = post_body(app, "/lemmatize", json!({ "text": input }).to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("20001"));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0, "model must not be invoked");
}

#[tokio::test]
async fn non_string_text_is_rejected() {
    let (status, _) =
        post_body(whitespace_app(), "/lemmatize", json!({"text": 42}).to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let (status, _) = post_body(whitespace_app(), "/lemmatize", "not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn model_failure_maps_to_server_error() {
    let app = test_app(Arc::new(FailingModel));
    let (status, body) = post_json(app, "/lemmatize", &json!({"text": "boom"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("annotation failed"));
}

#[tokio::test]
async fn identical_requests_yield_identical_responses() {
    let app = whitespace_app();
    let request = json!({"text": "She sells sea shells"});

    let (first_status, first) = post_json(app.clone(), "/lemmatize", &request).await;
    let (second_status, second) = post_json(app.clone(), "/lemmatize", &request).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);

    // The model name is the same one /health reports.
    let (_, health) = get(app, "/health").await;
    assert_eq!(first["model"], health["model"]);
}

#[tokio::test]
async fn offsets_are_character_based() {
    let input = "café déjà vu";
    let (status, body) =
        post_json(whitespace_app(), "/lemmatize", &json!({ "text": input })).await;

    assert_eq!(status, StatusCode::OK);
    let tokens = body["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 3);

    // "déjà" sits at char offsets 5..9; byte offsets would be 6..12.
    assert_eq!(tokens[1]["text"], "déjà");
    assert_eq!(tokens[1]["start"], 5);
    assert_eq!(tokens[1]["end"], 9);

    for token in tokens {
        let start = token["start"].as_u64().unwrap() as usize;
        let end = token["end"].as_u64().unwrap() as usize;
        assert_eq!(token["text"].as_str().unwrap(), char_slice(input, start, end));
    }
}
