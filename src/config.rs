//! Responder configuration, loaded from TOML

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides `completion.api_key`
pub const API_KEY_ENV: &str = "LEGAL_RESPONDER_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// External completion service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Cleaned replies shorter than this trigger the local fallback
    pub min_reply_chars: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 30,
            min_reply_chars: 30,
        }
    }
}

/// Exchange persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// REST base URL; persistence is off when unset
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Tried in order until one insert succeeds
    pub tables: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            tables: vec!["chat_history".to_string(), "ai_chat_history".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Default state of the AI toggle
    pub ai_enabled: bool,
    pub completion: CompletionConfig,
    pub store: StoreConfig,
}

impl ResponderConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.completion.api_key = Some(key);
            }
        }
    }
}
