//! Assistant settings, loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    pub limits: Limits,
    pub service: ServiceConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Files per composing turn.
    pub max_files: usize,
    pub max_file_bytes: u64,
    pub pdf_max_pages: usize,
    pub text_max_chars: usize,
    /// Characters of each non-image attachment forwarded in the context block.
    pub context_attachment_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_files: 5,
            max_file_bytes: 10 * 1024 * 1024,
            pdf_max_pages: 10,
            text_max_chars: 10_000,
            context_attachment_chars: 3_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub completion_url: String,
    pub store_base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            completion_url: "http://localhost:3000/api/chat".to_string(),
            store_base_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Prior messages forwarded with each request; 0 forwards all of them.
    pub max_messages: usize,
}

impl AssistantConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: AssistantConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.limits;
        if l.max_files == 0 {
            return Err(ConfigError::Invalid("limits.max_files must be at least 1".into()));
        }
        if l.max_file_bytes == 0 {
            return Err(ConfigError::Invalid("limits.max_file_bytes must be positive".into()));
        }
        if l.pdf_max_pages == 0 || l.text_max_chars == 0 || l.context_attachment_chars == 0 {
            return Err(ConfigError::Invalid("extraction limits must be positive".into()));
        }
        if self.service.timeout_secs == 0 {
            return Err(ConfigError::Invalid("service.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
