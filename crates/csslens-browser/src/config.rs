//! Tab manager configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Persisted tab manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Timeout for page and stylesheet fetches.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Fetch same-origin `<link rel="stylesheet">` targets when a page opens.
    #[serde(default = "default_true")]
    pub load_linked_stylesheets: bool,
    /// Oldest tabs are closed beyond this many.
    #[serde(default = "default_max_tabs")]
    pub max_tabs: usize,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_max_tabs() -> usize {
    32
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: 30,
            load_linked_stylesheets: true,
            max_tabs: 32,
        }
    }
}

impl BrowserConfig {
    /// Load config from a JSON file, or return defaults.
    pub fn load(config_path: &Path) -> Self {
        std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }
}
