//! Environment-driven service configuration.

use std::env;
use std::path::PathBuf;

/// Environment variable selecting the model identifier.
pub const MODEL_ENV: &str = "LEMMA_MODEL";
/// Environment variable selecting the models root directory.
pub const MODEL_DIR_ENV: &str = "LEMMA_MODEL_DIR";

/// Standard small English model, used when `LEMMA_MODEL` is unset or empty.
pub const DEFAULT_MODEL: &str = "en-core-sm";
const DEFAULT_MODEL_DIR: &str = "models";

/// Configuration resolved once at process startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Resolved model identifier, reported in every response
    pub model: String,
    /// Directory containing model packages
    pub model_dir: PathBuf,
}

impl ServiceConfig {
    /// Read configuration from the environment, applying defaults.
    pub fn from_env() -> Self {
        Self {
            model: resolve(env::var(MODEL_ENV).ok(), DEFAULT_MODEL),
            model_dir: PathBuf::from(resolve(env::var(MODEL_DIR_ENV).ok(), DEFAULT_MODEL_DIR)),
        }
    }
}

/// Unset and empty both mean "use the default".
fn resolve(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}
