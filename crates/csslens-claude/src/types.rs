//! Interpreted records and Messages API wire types.

use serde::{Deserialize, Serialize};

/// Core design tokens inferred from a page. Every field is nullable; a null
/// group reads as a group of nulls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignTokens {
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: ColorTokens,
    #[serde(default, deserialize_with = "null_as_default")]
    pub typography: TypographyTokens,
    #[serde(default)]
    pub radius: Option<String>,
    #[serde(default)]
    pub shadow: Option<String>,
    #[serde(default)]
    pub spacing: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorTokens {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub border: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypographyTokens {
    #[serde(default, rename = "fontFamily")]
    pub font_family: Option<String>,
    #[serde(default, rename = "fontSize")]
    pub font_size: Option<String>,
    #[serde(default, rename = "fontWeight")]
    pub font_weight: Option<String>,
    #[serde(default, rename = "lineHeight")]
    pub line_height: Option<String>,
}

/// Architectural classification of a page's CSS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureAnalysis {
    /// Detected UI component kinds, e.g. `button`, `card`, `navbar`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<String>,
    /// `flexbox`, `grid`, `table` or `mixed`.
    #[serde(default)]
    pub layout: Option<String>,
    /// `utility-first`, `BEM`, `CSS-in-JS`, `SMACSS`, `plain` or `mixed`.
    #[serde(default, rename = "cssArchitecture")]
    pub css_architecture: Option<String>,
    /// `light-only`, `dark-only`, `light-default`, `dark-default` or `system`.
    #[serde(default, rename = "colorMode")]
    pub color_mode: Option<String>,
    /// `simple`, `moderate` or `complex`.
    #[serde(default)]
    pub complexity: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------
// Messages API wire types
// ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<RequestMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

/// Error body returned by the API on non-success status.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: Option<String>,
}
