//! Persisted record shapes.

use std::collections::BTreeMap;

use csslens_claude::{DesignTokens, StructureAnalysis};
use serde::{Deserialize, Serialize};

/// Well-known storage keys.
pub mod keys {
    pub const API_KEY: &str = "apiKey";
    pub const DESIGNS: &str = "designs";
    pub const STRUCTURES: &str = "structures";
}

/// Design tokens saved for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDesign {
    pub tokens: DesignTokens,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "savedAt")]
    pub saved_at: i64,
}

/// Structure analysis saved for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStructure {
    pub structure: StructureAnalysis,
    #[serde(rename = "savedAt")]
    pub saved_at: i64,
}

/// Page URL → latest saved design.
pub type DesignMap = BTreeMap<String, SavedDesign>;

/// Page URL → latest saved structure analysis.
pub type StructureMap = BTreeMap<String, SavedStructure>;
