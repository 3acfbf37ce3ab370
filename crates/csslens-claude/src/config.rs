//! Interpretation client configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Stored client configuration (persisted to claude-config.json).
///
/// The API key is not part of it; that lives in the key-value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeConfig {
    /// Base URL; requests go to `{api_base}/messages`.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ClaudeConfig {
    /// Load config from file, then apply env overrides.
    pub fn load(config_path: &Path) -> Self {
        let mut config: ClaudeConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        if let Ok(base) = std::env::var("CSSLENS_API_BASE") {
            config.api_base = base;
        }
        if let Ok(model) = std::env::var("CSSLENS_MODEL") {
            config.model = model;
        }

        config
    }

    /// Messages endpoint URL.
    pub fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base.trim_end_matches('/'))
    }
}
