//! Annotation pipeline over a pre-trained model package.
//!
//! A model package is a directory under the models root, named by the model
//! identifier:
//!
//! ```text
//! <models_dir>/<name>/
//!     meta.json        name, lang, version, components, tagset
//!     tokenizer.json   HuggingFace tokenizers file
//!     tagger.onnx      token-classification model (per-token tag logits)
//!     lemmas.json      lemma lookup table
//! ```
//!
//! The pipeline is loaded once at process startup and shared read-only for
//! the process lifetime; `annotate` takes `&self` and is safe to call from
//! concurrent request handlers.

use std::path::Path;

use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::lemmatizer::LemmaTable;
use crate::meta::ModelMeta;
use crate::types::{Annotation, Annotator, Token};

/// Components never loaded, whatever the package declares. Named-entity
/// recognition is not part of this service's output; skipping it keeps
/// startup and inference light.
const EXCLUDED_COMPONENTS: &[&str] = &["ner"];

/// ONNX tagger: session plus the tag per output class.
#[derive(Debug)]
struct Tagger {
    session: Session,
    tagset: Vec<String>,
}

impl Tagger {
    fn load(root: &Path, name: &str, tagset: &[String]) -> Result<Self> {
        let path = root.join("tagger.onnx");
        if !path.exists() {
            return Err(EngineError::ModelLoad(format!(
                "model '{}' is missing tagger.onnx",
                name
            )));
        }
        if tagset.is_empty() {
            return Err(EngineError::ModelLoad(format!(
                "model '{}' declares a tagger but meta.json has an empty tagset",
                name
            )));
        }

        let session = Session::builder()
            .map_err(|e| EngineError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EngineError::ModelLoad(e.to_string()))?
            .commit_from_file(&path)
            .map_err(|e| EngineError::ModelLoad(e.to_string()))?;

        Ok(Self {
            session,
            tagset: tagset.to_vec(),
        })
    }

    /// Tag a sequence of token ids, one coarse POS tag per token.
    fn tag(&self, ids: &[u32]) -> Result<Vec<String>> {
        let n = ids.len();

        let input_ids: Vec<i64> = ids.iter().map(|&id| id as i64).collect();
        let input_ids = Array2::from_shape_vec((1, n), input_ids).map_err(|e| {
            EngineError::Inference(format!("failed to create input_ids tensor: {}", e))
        })?;
        let attention_mask = Array2::<i64>::from_elem((1, n), 1);

        let outputs = self
            .session
            .run(
                ort::inputs! {
                    "input_ids" => input_ids,
                    "attention_mask" => attention_mask,
                }
                .map_err(|e| EngineError::Inference(e.to_string()))?,
            )
            .map_err(|e| EngineError::Inference(e.to_string()))?;

        let logits = outputs
            .get("logits")
            .or_else(|| outputs.get("scores"))
            .ok_or_else(|| EngineError::Inference("no logits output found".to_string()))?;

        let logits: ndarray::ArrayViewD<f32> = logits
            .try_extract_tensor()
            .map_err(|e| EngineError::Inference(e.to_string()))?;

        // Expected shape: [1, seq_len, n_tags]
        let shape = logits.shape();
        if shape.len() != 3 || shape[0] != 1 || shape[1] != n {
            return Err(EngineError::Inference(format!(
                "unexpected logits shape: {:?}",
                shape
            )));
        }
        if shape[2] != self.tagset.len() {
            return Err(EngineError::Inference(format!(
                "model emits {} classes but tagset has {}",
                shape[2],
                self.tagset.len()
            )));
        }

        let mut tags = Vec::with_capacity(n);
        for i in 0..n {
            let class = argmax(logits.slice(ndarray::s![0, i, ..]).iter().copied());
            tags.push(self.tagset[class].clone());
        }

        Ok(tags)
    }
}

/// Loaded model handle: tokenizer, tagger, and lemma table behind one
/// `annotate` pass.
#[derive(Debug)]
pub struct Pipeline {
    meta: ModelMeta,
    tokenizer: Tokenizer,
    tagger: Tagger,
    lemmas: LemmaTable,
}

impl Pipeline {
    /// Load the model package `<models_dir>/<name>`, excluding the `ner`
    /// component.
    ///
    /// Any failure names the attempted model identifier so a startup crash
    /// tells the operator which model was requested.
    pub fn load(models_dir: &Path, name: &str) -> Result<Self> {
        let root = models_dir.join(name);
        if !root.is_dir() {
            return Err(EngineError::ModelLoad(format!(
                "model '{}' not found under {}",
                name,
                models_dir.display()
            )));
        }

        let meta = ModelMeta::from_file(&root.join("meta.json"))?;

        let tokenizer = Tokenizer::from_file(root.join("tokenizer.json"))
            .map_err(|e| EngineError::TokenizerLoad(format!("model '{}': {}", name, e)))?;

        let mut tagger = None;
        let mut lemmas = None;
        for component in &meta.components {
            if EXCLUDED_COMPONENTS.contains(&component.as_str()) {
                debug!("model '{}': skipping excluded component '{}'", name, component);
                continue;
            }
            match component.as_str() {
                "tagger" => tagger = Some(Tagger::load(&root, name, &meta.tagset)?),
                "lemmatizer" => lemmas = Some(LemmaTable::from_file(&root.join("lemmas.json"))?),
                other => warn!("model '{}': unknown component '{}', ignoring", name, other),
            }
        }

        let tagger = tagger.ok_or_else(|| {
            EngineError::ModelLoad(format!("model '{}' has no tagger component", name))
        })?;
        let lemmas = lemmas.ok_or_else(|| {
            EngineError::ModelLoad(format!("model '{}' has no lemmatizer component", name))
        })?;

        info!(
            "Loaded model '{}' v{} (lang {}, {} lemma entries)",
            name,
            meta.version,
            meta.lang,
            lemmas.len()
        );

        Ok(Self {
            meta,
            tokenizer,
            tagger,
            lemmas,
        })
    }
}

impl Annotator for Pipeline {
    fn annotate(&self, text: &str) -> Result<Annotation> {
        let mut tokens = Vec::new();

        if !text.is_empty() {
            let encoding = self
                .tokenizer
                .encode_char_offsets(text, false)
                .map_err(|e| EngineError::Tokenization(e.to_string()))?;

            let ids = encoding.get_ids();
            let offsets = encoding.get_offsets();
            let special = encoding.get_special_tokens_mask();
            let bounds = char_bounds(text);

            let mut spans = Vec::new();
            let mut kept_ids = Vec::new();
            for i in 0..ids.len() {
                if special.get(i).copied().unwrap_or(0) == 1 {
                    continue;
                }
                let (start, end) = offsets[i];
                if start == end {
                    continue;
                }
                let surface = char_span(text, &bounds, start, end).ok_or_else(|| {
                    EngineError::Inference(format!(
                        "token offsets {}..{} out of bounds for {}-char input",
                        start,
                        end,
                        bounds.len() - 1
                    ))
                })?;
                spans.push((start, surface.to_string()));
                kept_ids.push(ids[i]);
            }

            if !kept_ids.is_empty() {
                let tags = self.tagger.tag(&kept_ids)?;
                debug!("annotated {} tokens from {} chars", tags.len(), bounds.len() - 1);
                for ((start, surface), pos) in spans.into_iter().zip(tags) {
                    let lemma = self.lemmas.lemma(&surface);
                    tokens.push(Token {
                        text: surface,
                        lemma,
                        pos,
                        start,
                    });
                }
            }
        }

        Ok(Annotation {
            language: self.meta.lang.clone(),
            tokens,
        })
    }
}

/// Byte offset of each character boundary, with a trailing entry for the
/// end of the string. Index k is the k-th character's byte position.
fn char_bounds(text: &str) -> Vec<usize> {
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    bounds
}

/// Character span `[start..end)` of `text`, or `None` when the offsets do
/// not fit the input.
fn char_span<'a>(text: &'a str, bounds: &[usize], start: usize, end: usize) -> Option<&'a str> {
    if start > end || end >= bounds.len() {
        return None;
    }
    Some(&text[bounds[start]..bounds[end]])
}

/// Index of the highest score. Ties resolve to the first maximum.
fn argmax(scores: impl Iterator<Item = f32>) -> usize {
    let mut best = 0;
    let mut best_score = f32::NEG_INFINITY;
    for (i, score) in scores.enumerate() {
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}
