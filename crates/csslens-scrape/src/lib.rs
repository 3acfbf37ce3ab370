//! Page scraper: raw CSS snapshots of a loaded page.
//!
//! [`extract_css`] reads any [`PageDocument`]. [`HtmlDocument`] is the
//! static-HTML provider used by the tab manager.

pub mod css;
pub mod document;
pub mod extract;
pub mod html;
pub mod snapshot;

pub use document::{
    ComputedStyle, PageDocument, SheetAccessError, StyleSheet, CAPTURED_PROPERTIES, TARGET_ELEMENTS,
};
pub use extract::extract_css;
pub use html::{is_same_origin, HtmlDocument};
pub use snapshot::{CssSnapshot, PropertyMap};
