//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3004;

/// Paths to all csslens data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Key-value store directory (`data/store/`).
    pub store: PathBuf,
    /// Interpretation client configuration (`data/claude-config.json`).
    pub claude_config_file: PathBuf,
    /// Tab manager configuration (`data/browser.json`).
    pub browser_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            store: root.join("store"),
            claude_config_file: root.join("claude-config.json"),
            browser_config_file: root.join("browser.json"),
            root,
        };
        std::fs::create_dir_all(&paths.store)?;
        Ok(paths)
    }
}

/// Top-level csslens configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CssLensConfig {
    /// HTTP server port.
    pub port: u16,
    pub data_paths: DataPaths,
}

impl CssLensConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            port,
            data_paths: DataPaths::new(data_dir)?,
        })
    }
}

/// Normalize a page URL for use as a storage key.
///
/// Fragments are dropped; anything the URL parser rejects is used trimmed.
pub fn normalize_page_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match url::Url::parse(trimmed) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}
