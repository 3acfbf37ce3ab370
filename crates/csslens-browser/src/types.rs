//! Tab manager types.

use serde::{Deserialize, Serialize};

/// Summary of an open tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: u64,
    pub url: String,
    pub title: String,
    pub opened_at: String,
    /// Stylesheets attached to the page, accessible or not.
    pub stylesheets: usize,
    /// Stylesheets whose rules cannot be read (cross-origin or failed fetch).
    pub inaccessible_stylesheets: usize,
}

/// Request to open a page in a new tab.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenTabRequest {
    pub url: String,
}
