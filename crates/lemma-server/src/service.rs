//! HTTP surface: request/response types, router, and handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::debug;

use lemma_core::{Annotator, EngineError};

/// Maximum accepted request text length, in characters.
pub const MAX_TEXT_CHARS: usize = 20_000;

/// Request body for `POST /lemmatize`. A missing `text` field is treated as
/// the empty string, which is valid input producing zero tokens.
#[derive(Debug, Deserialize)]
pub struct LemmatizeRequest {
    #[serde(default)]
    pub text: String,
}

/// One annotated token in the response.
#[derive(Debug, Serialize)]
pub struct TokenOut {
    pub text: String,
    pub lemma: String,
    pub pos: String,
    pub start: usize,
    pub end: usize,
}

/// Response body for `POST /lemmatize`.
#[derive(Debug, Serialize)]
pub struct LemmatizeResponse {
    pub language: String,
    pub model: String,
    pub tokens: Vec<TokenOut>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub model: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler-level errors, mapped to client-facing responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("text length {len} exceeds maximum of {max} characters")]
    TextTooLong { len: usize, max: usize },

    #[error("annotation failed: {0}")]
    Annotation(#[from] EngineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::TextTooLong { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Annotation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Shared application state: the loaded model handle and its resolved name.
/// Immutable after startup; cheap to clone into each handler.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<dyn Annotator>,
    model_name: Arc<String>,
}

impl AppState {
    pub fn new(pipeline: Arc<dyn Annotator>, model_name: impl Into<String>) -> Self {
        Self {
            pipeline,
            model_name: Arc::new(model_name.into()),
        }
    }
}

/// Build the application router with tracing and CORS middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/lemmatize", post(lemmatize))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// Liveness probe. Always succeeds while the process is serving.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        model: state.model_name.as_ref().clone(),
    })
}

/// Tokenize and lemmatize the request text in a single model pass.
async fn lemmatize(
    State(state): State<AppState>,
    Json(req): Json<LemmatizeRequest>,
) -> Result<Json<LemmatizeResponse>, ApiError> {
    let len = req.text.chars().count();
    if len > MAX_TEXT_CHARS {
        return Err(ApiError::TextTooLong {
            len,
            max: MAX_TEXT_CHARS,
        });
    }

    let annotation = state.pipeline.annotate(&req.text)?;
    debug!("lemmatize: {} chars -> {} tokens", len, annotation.tokens.len());

    let tokens = annotation
        .tokens
        .into_iter()
        .map(|t| {
            let end = t.start + t.text.chars().count();
            TokenOut {
                text: t.text,
                lemma: t.lemma,
                pos: t.pos,
                start: t.start,
                end,
            }
        })
        .collect();

    Ok(Json(LemmatizeResponse {
        language: annotation.language,
        model: state.model_name.as_ref().clone(),
        tokens,
    }))
}
