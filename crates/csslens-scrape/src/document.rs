//! The DOM surface the scraper reads from.

use thiserror::Error;

/// Elements sampled for computed styles, in sampling order.
pub const TARGET_ELEMENTS: [&str; 8] = ["body", "h1", "h2", "h3", "p", "a", "button", "input"];

/// Properties captured for every sampled element.
pub const CAPTURED_PROPERTIES: [&str; 16] = [
    "color",
    "background-color",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "letter-spacing",
    "border-radius",
    "box-shadow",
    "padding",
    "margin",
    "border-color",
    "border-width",
    "border-style",
    "text-decoration",
    "opacity",
];

/// Why a stylesheet's rules could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetAccessError {
    #[error("cross-origin stylesheet {0}")]
    CrossOrigin(String),
    #[error("stylesheet {href} unavailable: {reason}")]
    Unavailable { href: String, reason: String },
}

/// One stylesheet attached to a document.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    pub href: Option<String>,
    rules: Result<Vec<String>, SheetAccessError>,
}

impl StyleSheet {
    /// An inline `<style>` sheet.
    pub fn inline(rules: Vec<String>) -> Self {
        Self { href: None, rules: Ok(rules) }
    }

    /// A linked sheet whose rules were loaded.
    pub fn linked(href: impl Into<String>, rules: Vec<String>) -> Self {
        Self {
            href: Some(href.into()),
            rules: Ok(rules),
        }
    }

    /// A linked sheet that throws on rule access.
    pub fn inaccessible(href: impl Into<String>, error: SheetAccessError) -> Self {
        Self {
            href: Some(href.into()),
            rules: Err(error),
        }
    }

    /// Serialized rule text, or the access error a browser would throw.
    pub fn css_rules(&self) -> Result<&[String], &SheetAccessError> {
        self.rules.as_deref()
    }

    pub fn is_accessible(&self) -> bool {
        self.rules.is_ok()
    }
}

/// Resolved style of one element, as `getComputedStyle` would report it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    properties: Vec<(String, String)>,
}

impl ComputedStyle {
    pub fn new(properties: Vec<(String, String)>) -> Self {
        Self { properties }
    }

    /// Value of `name`, or the empty string when it is not set.
    pub fn get_property_value(&self, name: &str) -> &str {
        self.properties
            .iter()
            .rev()
            .find(|(prop, _)| prop == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(prop, _)| prop.as_str())
    }
}

/// A loaded page the scraper can read.
pub trait PageDocument {
    /// The page's address (`location.href`).
    fn location(&self) -> &str;

    fn title(&self) -> &str;

    /// All stylesheets, in document order.
    fn style_sheets(&self) -> &[StyleSheet];

    /// Computed style of the root (`<html>`) element.
    fn root_computed_style(&self) -> ComputedStyle;

    /// Computed style of the first element with this tag, `None` if the page has none.
    fn computed_style_of(&self, tag: &str) -> Option<ComputedStyle>;
}
