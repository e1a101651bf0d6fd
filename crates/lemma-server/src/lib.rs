//! Lemma Service - HTTP Layer
//!
//! Thin axum wrapper over a loaded annotation pipeline: validate the
//! request body, invoke the model once, serialize its token stream.

pub mod config;
pub mod service;
pub mod shutdown;

pub use config::ServiceConfig;
pub use service::{router, AppState};
