//! Interpretation client: turns CSS snapshots into design tokens and
//! structure analyses via the Anthropic Messages API.

pub mod client;
pub mod config;
pub mod prompts;
pub mod types;

pub use client::{ClaudeClient, Interpreter};
pub use config::ClaudeConfig;
pub use types::{ColorTokens, DesignTokens, StructureAnalysis, TypographyTokens};
