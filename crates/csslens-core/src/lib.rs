//! csslens core: error type, configuration, data paths.

pub mod config;
pub mod error;

pub use config::{normalize_page_url, CssLensConfig, DataPaths};
pub use error::{Error, Result};
