//! Lemma Service - Annotation Engine
//!
//! Loads a pre-trained model package (tokenizer, POS tagger, lemma table)
//! and exposes a single-pass annotate operation over it.

pub mod engine;
pub mod error;
pub mod lemmatizer;
pub mod meta;
pub mod types;

pub use engine::Pipeline;
pub use error::{EngineError, Result};
pub use lemmatizer::LemmaTable;
pub use meta::ModelMeta;
pub use types::{Annotation, Annotator, Token};
