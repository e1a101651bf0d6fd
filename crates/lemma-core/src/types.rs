//! Annotation output types and the model-handle trait.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single token produced by the model.
///
/// `start` is a zero-based character offset into the original input; the
/// surface `text` is exactly the input's `[start..start + chars(text))`
/// character span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form as it appears in the input
    pub text: String,
    /// Base/dictionary form
    pub lemma: String,
    /// Coarse part-of-speech tag (model-defined tag set)
    pub pos: String,
    /// Character offset of the token's first character
    pub start: usize,
}

/// Whole-document output of a single annotation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Language code reported by the model
    pub language: String,
    /// Tokens in left-to-right document order
    pub tokens: Vec<Token>,
}

/// Read-only handle to a loaded model.
///
/// Implementations must be safe to share across concurrent request
/// handlers; the service performs no writes after startup. The trait exists
/// so the HTTP layer can be exercised against an in-memory double without
/// any model files on disk.
pub trait Annotator: Send + Sync {
    /// Tokenize, tag, and lemmatize `text` in a single pass.
    fn annotate(&self, text: &str) -> Result<Annotation>;
}
