//! Tab manager: page loading, tab table, one-shot extract delivery.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::BrowserConfig;
use crate::types::TabInfo;
use csslens_core::{Error, Result};
use csslens_scrape::{
    extract_css, is_same_origin, CssSnapshot, HtmlDocument, PageDocument, SheetAccessError,
};

/// Reply when a message targets a tab that does not exist.
pub const NO_RECEIVER: &str = "Could not establish connection. Receiving end does not exist";

/// Delivers one-shot messages to a tab's content context.
#[async_trait]
pub trait TabMessenger: Send + Sync {
    /// Ask the tab to scrape itself and return the snapshot.
    async fn send_extract(&self, tab_id: u64) -> Result<CssSnapshot>;
}

struct Tab {
    info: TabInfo,
    document: HtmlDocument,
}

/// Holds loaded pages addressable by tab id.
pub struct TabManager {
    config: BrowserConfig,
    client: Client,
    tabs: RwLock<BTreeMap<u64, Tab>>,
    next_id: AtomicU64,
}

impl TabManager {
    pub fn new(config: BrowserConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            tabs: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    // ---------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------

    /// Fetch a page, resolve its linked stylesheets and open it in a new tab.
    pub async fn open(&self, url: &str) -> Result<TabInfo> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Failed to load {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!("HTTP {} for {}", status, url)));
        }
        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read {}: {}", url, e)))?;

        let mut document = HtmlDocument::parse(&final_url, &html);
        for href in document.pending_stylesheets() {
            let content = self.load_stylesheet(&final_url, &href).await;
            document.attach_stylesheet(&href, content);
        }

        Ok(self.insert(document))
    }

    async fn load_stylesheet(
        &self,
        page_url: &str,
        href: &str,
    ) -> std::result::Result<String, SheetAccessError> {
        if !is_same_origin(page_url, href) {
            return Err(SheetAccessError::CrossOrigin(href.to_string()));
        }
        if !self.config.load_linked_stylesheets {
            return Err(SheetAccessError::Unavailable {
                href: href.to_string(),
                reason: "linked stylesheet loading disabled".into(),
            });
        }

        let unavailable = |reason: String| SheetAccessError::Unavailable {
            href: href.to_string(),
            reason,
        };
        let response = self
            .client
            .get(href)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        if !response.status().is_success() {
            warn!("Stylesheet {} returned {}", href, response.status());
            return Err(unavailable(format!("HTTP {}", response.status())));
        }
        response.text().await.map_err(|e| unavailable(e.to_string()))
    }

    /// Open an already-parsed document in a new tab.
    pub fn insert(&self, document: HtmlDocument) -> TabInfo {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sheets = document.style_sheets();
        let info = TabInfo {
            id,
            url: document.location().to_string(),
            title: document.title().to_string(),
            opened_at: chrono::Utc::now().to_rfc3339(),
            stylesheets: sheets.len(),
            inaccessible_stylesheets: sheets.iter().filter(|s| !s.is_accessible()).count(),
        };

        let mut tabs = self.tabs.write();
        while tabs.len() >= self.config.max_tabs.max(1) {
            if let Some((&oldest, _)) = tabs.iter().next() {
                tabs.remove(&oldest);
                debug!("Closed tab {} (tab limit reached)", oldest);
            }
        }
        tabs.insert(
            id,
            Tab {
                info: info.clone(),
                document,
            },
        );

        info!("Opened tab {}: {}", id, info.url);
        info
    }

    // ---------------------------------------------------------------
    // Tab table
    // ---------------------------------------------------------------

    pub fn list(&self) -> Vec<TabInfo> {
        self.tabs.read().values().map(|t| t.info.clone()).collect()
    }

    pub fn get(&self, id: u64) -> Option<TabInfo> {
        self.tabs.read().get(&id).map(|t| t.info.clone())
    }

    /// Close a tab. Returns whether it was open.
    pub fn close(&self, id: u64) -> bool {
        let removed = self.tabs.write().remove(&id).is_some();
        if removed {
            info!("Closed tab {}", id);
        }
        removed
    }
}

#[async_trait]
impl TabMessenger for TabManager {
    async fn send_extract(&self, tab_id: u64) -> Result<CssSnapshot> {
        let tabs = self.tabs.read();
        let tab = tabs
            .get(&tab_id)
            .ok_or_else(|| Error::Extraction(NO_RECEIVER.to_string()))?;
        Ok(extract_css(&tab.document))
    }
}
