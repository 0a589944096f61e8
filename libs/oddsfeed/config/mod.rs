//! Engine configuration.
//!
//! The session/environment values the feed protocol needs (operator id,
//! content language) are passed in here rather than read from ambient
//! state, so one process can run engines against different operators.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Operator the feed session is scoped to.
    pub operator_id: String,

    /// Content language for translated names.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            operator_id: "demo".to_string(),
            language: default_language(),
        }
    }
}

impl EngineConfig {
    /// Load from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.operator_id.is_empty() {
            return Err(ConfigError::ValidationError(
                "operator_id must not be empty".to_string(),
            ));
        }
        if self.language.is_empty() {
            return Err(ConfigError::ValidationError(
                "language must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
