/// Runtime configuration
///
/// Defaults, then `~/.word-arith/config.json` if present, then environment
/// variables. Command-line flags are applied last by the binary.

use crate::error::{Result, WordArithError};
use crate::interpreter::DEFAULT_DELIMITER;
use crate::model::DEFAULT_DIMENSION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_MODEL_DIR: &str = "WORD_ARITH_MODEL_DIR";
pub const ENV_DIMENSION: &str = "WORD_ARITH_DIMENSION";

const APP_DIR: &str = ".word-arith";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the a.txt .. z.txt shards
    pub model_dir: PathBuf,
    pub dimension: usize,
    pub delimiter: String,
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: app_dir().join("model"),
            dimension: DEFAULT_DIMENSION,
            delimiter: DEFAULT_DELIMITER.to_string(),
            prompt: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// `~/.word-arith`, or `./.word-arith` when there is no home directory
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Config {
    /// Load defaults, the user config file and environment overrides
    pub fn load() -> Result<Self> {
        let path = app_dir().join(CONFIG_FILE);
        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config
            .with_overrides(|key| std::env::var(key).ok())?
            .validated()
    }

    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        debug!(path = %path.display(), "config file loaded");
        config.validated()
    }

    /// Apply `WORD_ARITH_*` overrides through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_MODEL_DIR) {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_DIMENSION) {
            self.dimension = raw.trim().parse().map_err(|_| {
                WordArithError::Config(format!(
                    "{} must be a positive integer, got '{}'",
                    ENV_DIMENSION, raw
                ))
            })?;
        }
        Ok(self)
    }

    fn validated(self) -> Result<Self> {
        if self.dimension == 0 {
            return Err(WordArithError::Config(
                "dimension must be greater than zero".to_string(),
            ));
        }
        if self.delimiter.trim().is_empty() {
            return Err(WordArithError::Config(
                "delimiter must not be blank".to_string(),
            ));
        }
        Ok(self)
    }
}
