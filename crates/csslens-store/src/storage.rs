//! Storage service consumed by the relay.

use csslens_claude::{DesignTokens, StructureAnalysis};
use csslens_core::Result;

use crate::types::{DesignMap, SavedDesign, SavedStructure, StructureMap};

/// Credential and result persistence.
///
/// Results are addressed by normalized page URL; a later save for the same
/// URL replaces the earlier one.
pub trait Storage: Send + Sync {
    /// The configured API key, `None` when unset or blank.
    fn api_key(&self) -> Result<Option<String>>;

    fn set_api_key(&self, key: &str) -> Result<()>;

    /// Remove the API key. Returns whether one was stored.
    fn clear_api_key(&self) -> Result<bool>;

    fn save_design(&self, url: &str, tokens: &DesignTokens) -> Result<SavedDesign>;

    fn design(&self, url: &str) -> Result<Option<SavedDesign>>;

    fn designs(&self) -> Result<DesignMap>;

    fn save_structure(&self, url: &str, structure: &StructureAnalysis) -> Result<SavedStructure>;

    fn structure(&self, url: &str) -> Result<Option<SavedStructure>>;

    fn structures(&self) -> Result<StructureMap>;
}
