//! Lookup-table lemmatizer (`lemmas.json`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, Result};

/// Lemma lookup table shipped with a model package.
///
/// Keys are lowercased surface forms. A miss falls back to the lowercased
/// surface itself, so unknown words still get a stable base form.
#[derive(Debug)]
pub struct LemmaTable {
    lookup: HashMap<String, String>,
}

impl LemmaTable {
    /// Read `lemmas.json` (a flat surface → lemma object).
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            EngineError::ModelLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        let lookup: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            EngineError::ModelLoad(format!("invalid lemmas.json at {}: {}", path.display(), e))
        })?;

        Ok(Self { lookup })
    }

    /// Build a table from an in-memory map.
    pub fn from_lookup(lookup: HashMap<String, String>) -> Self {
        Self { lookup }
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Base form for a surface token.
    pub fn lemma(&self, surface: &str) -> String {
        let lower = surface.to_lowercase();
        match self.lookup.get(&lower) {
            Some(lemma) => lemma.clone(),
            None => lower,
        }
    }
}
