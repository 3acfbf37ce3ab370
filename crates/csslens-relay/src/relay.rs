//! Message relay.
//!
//! Validates a message, scrapes the target tab, hands the snapshot to the
//! interpreter with the stored credential and persists the result under
//! the snapshot's URL.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::messages::{Message, Reply};
use csslens_browser::TabMessenger;
use csslens_claude::{DesignTokens, Interpreter, StructureAnalysis};
use csslens_core::{Error, Result};
use csslens_scrape::CssSnapshot;
use csslens_store::{DesignMap, SavedDesign, SavedStructure, Storage, StructureMap};

const RELOAD_HINT: &str = "Try reloading the tab.";

pub struct Relay {
    storage: Arc<dyn Storage>,
    tabs: Arc<dyn TabMessenger>,
    interpreter: Arc<dyn Interpreter>,
}

impl Relay {
    pub fn new(
        storage: Arc<dyn Storage>,
        tabs: Arc<dyn TabMessenger>,
        interpreter: Arc<dyn Interpreter>,
    ) -> Self {
        Self {
            storage,
            tabs,
            interpreter,
        }
    }

    /// Dispatch one message. Every failure becomes an `ok: false` reply.
    pub async fn handle(&self, message: Message) -> Reply {
        let action = message.action();
        debug!("Relay message: {}", action);

        let reply = match message {
            Message::Extract { tab_id } => Reply::from_result(self.extract(tab_id).await),
            Message::ExtractTokens { tab_id } => Reply::from_result(self.extract_tokens(tab_id).await),
            Message::AnalyzeStructure { tab_id } => {
                Reply::from_result(self.analyze_structure(tab_id).await)
            }
            Message::GetDesign { url } => Reply::from_result(self.get_design(url.as_deref())),
            Message::ListDesigns => Reply::from_result(self.list_designs()),
            Message::GetStructure { url } => Reply::from_result(self.get_structure(url.as_deref())),
            Message::ListStructures => Reply::from_result(self.list_structures()),
            Message::SetApiKey { api_key } => match self.set_api_key(api_key.as_deref()) {
                Ok(()) => Reply::done(),
                Err(e) => Reply::failure(e),
            },
        };

        if let Some(error) = &reply.error {
            warn!("{} failed: {}", action, error);
        }
        reply
    }

    /// Decode a raw JSON message and dispatch it.
    pub async fn handle_value(&self, value: serde_json::Value) -> Reply {
        match serde_json::from_value::<Message>(value) {
            Ok(message) => self.handle(message).await,
            Err(e) => Reply::failure(format!("Invalid message: {}", e)),
        }
    }

    // ---------------------------------------------------------------
    // Pipeline operations
    // ---------------------------------------------------------------

    /// Raw snapshot of a tab.
    pub async fn extract(&self, tab_id: Option<u64>) -> Result<CssSnapshot> {
        let tab_id = tab_id.ok_or(Error::MissingInput("tabId"))?;
        self.scrape(tab_id).await
    }

    /// Derive design tokens from a tab and save them.
    pub async fn extract_tokens(&self, tab_id: Option<u64>) -> Result<DesignTokens> {
        let tab_id = tab_id.ok_or(Error::MissingInput("tabId"))?;
        let api_key = self.require_api_key()?;
        let snapshot = self.scrape(tab_id).await?;

        let tokens = self.interpreter.extract_tokens(&snapshot, &api_key).await?;
        self.storage.save_design(&snapshot.url, &tokens)?;
        info!("Saved design tokens for {}", snapshot.url);
        Ok(tokens)
    }

    /// Derive a structure analysis from a tab and save it.
    pub async fn analyze_structure(&self, tab_id: Option<u64>) -> Result<StructureAnalysis> {
        let tab_id = tab_id.ok_or(Error::MissingInput("tabId"))?;
        let api_key = self.require_api_key()?;
        let snapshot = self.scrape(tab_id).await?;

        let structure = self.interpreter.analyze_structure(&snapshot, &api_key).await?;
        self.storage.save_structure(&snapshot.url, &structure)?;
        info!("Saved structure analysis for {}", snapshot.url);
        Ok(structure)
    }

    fn require_api_key(&self) -> Result<String> {
        self.storage.api_key()?.ok_or(Error::NoCredential)
    }

    async fn scrape(&self, tab_id: u64) -> Result<CssSnapshot> {
        self.tabs
            .send_extract(tab_id)
            .await
            .map_err(|e| Error::Extraction(format!("{}. {}", e, RELOAD_HINT)))
    }

    // ---------------------------------------------------------------
    // Saved results and credential
    // ---------------------------------------------------------------

    pub fn get_design(&self, url: Option<&str>) -> Result<Option<SavedDesign>> {
        self.storage.design(required_url(url)?)
    }

    pub fn list_designs(&self) -> Result<DesignMap> {
        self.storage.designs()
    }

    pub fn get_structure(&self, url: Option<&str>) -> Result<Option<SavedStructure>> {
        self.storage.structure(required_url(url)?)
    }

    pub fn list_structures(&self) -> Result<StructureMap> {
        self.storage.structures()
    }

    pub fn set_api_key(&self, api_key: Option<&str>) -> Result<()> {
        let key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingInput("apiKey"))?;
        self.storage.set_api_key(key)
    }
}

fn required_url(url: Option<&str>) -> Result<&str> {
    url.map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(Error::MissingInput("url"))
}
