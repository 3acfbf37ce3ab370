//! Shared application state.

use std::sync::Arc;

use tracing::info;

use csslens_browser::{BrowserConfig, TabManager};
use csslens_claude::{ClaudeClient, ClaudeConfig};
use csslens_core::{CssLensConfig, Result};
use csslens_relay::Relay;
use csslens_store::{SqliteStore, Storage};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: CssLensConfig,
    pub store: Arc<SqliteStore>,
    pub tabs: Arc<TabManager>,
    pub relay: Relay,
    pub claude_config: ClaudeConfig,
}

impl AppState {
    pub fn new(config: CssLensConfig) -> Result<Self> {
        let store = Arc::new(SqliteStore::open(&config.data_paths.store)?);
        seed_api_key(store.as_ref())?;

        let browser_config = BrowserConfig::load(&config.data_paths.browser_config_file);
        let tabs = Arc::new(TabManager::new(browser_config)?);

        let claude_config = ClaudeConfig::load(&config.data_paths.claude_config_file);
        info!("Interpretation model: {}", claude_config.model);
        let interpreter = Arc::new(ClaudeClient::new(claude_config.clone()));

        let relay = Relay::new(store.clone(), tabs.clone(), interpreter);

        Ok(Self {
            config,
            store,
            tabs,
            relay,
            claude_config,
        })
    }
}

/// Store `ANTHROPIC_API_KEY` when no key has been configured yet.
fn seed_api_key(store: &dyn Storage) -> Result<()> {
    if store.api_key()?.is_some() {
        return Ok(());
    }
    if let Some(key) = std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
    {
        store.set_api_key(key.trim())?;
        info!("API key taken from ANTHROPIC_API_KEY");
    }
    Ok(())
}
