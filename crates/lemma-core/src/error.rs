//! Error types for model loading and annotation.

use thiserror::Error;

/// Errors raised while loading a model package or annotating text.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Model package missing, malformed, or incomplete
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Tokenizer file could not be read or parsed
    #[error("failed to load tokenizer: {0}")]
    TokenizerLoad(String),

    /// Tokenization of request text failed
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// Tagger inference or output mapping failed
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
