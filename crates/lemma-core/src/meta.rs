//! Model package metadata (`meta.json`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Metadata shipped at the root of every model package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Package name (informational; the resolved identifier is what the
    /// service reports)
    #[serde(default)]
    pub name: String,
    /// Language code the model reports for its documents
    pub lang: String,
    /// Package version
    #[serde(default)]
    pub version: String,
    /// Pipeline components in load order, e.g. ["tagger", "lemmatizer", "ner"]
    #[serde(default)]
    pub components: Vec<String>,
    /// Coarse POS tag per tagger output class, indexed by class id
    #[serde(default)]
    pub tagset: Vec<String>,
}

impl ModelMeta {
    /// Read and validate `meta.json`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            EngineError::ModelLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        let meta: ModelMeta = serde_json::from_str(&raw).map_err(|e| {
            EngineError::ModelLoad(format!("invalid meta.json at {}: {}", path.display(), e))
        })?;

        if meta.lang.is_empty() {
            return Err(EngineError::ModelLoad(format!(
                "meta.json at {} has no language code",
                path.display()
            )));
        }

        Ok(meta)
    }
}
