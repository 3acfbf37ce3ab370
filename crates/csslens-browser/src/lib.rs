//! Tab manager: loads pages into addressable tabs and delivers one-shot
//! extract requests to them.

pub mod config;
pub mod manager;
pub mod types;

pub use config::BrowserConfig;
pub use manager::{TabManager, TabMessenger, NO_RECEIVER};
pub use types::{OpenTabRequest, TabInfo};
