//! Snapshot record produced by one extraction.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Computed CSS values for one sampled element: property → value, in
/// capture order.
pub type PropertyMap = IndexMap<String, String>;

/// Raw CSS capture of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssSnapshot {
    pub url: String,
    pub title: String,
    /// Serialized rule text of every accessible stylesheet, in document order.
    #[serde(default)]
    pub stylesheet_rules: Vec<String>,
    /// Custom properties visible on the root element, in declaration order.
    #[serde(default)]
    pub css_variables: IndexMap<String, String>,
    /// Element tag → sampled computed properties, in sampling order. Absent
    /// elements have no entry.
    #[serde(default)]
    pub computed_styles: IndexMap<String, PropertyMap>,
}

impl CssSnapshot {
    pub fn has_variables(&self) -> bool {
        !self.css_variables.is_empty()
    }
}
