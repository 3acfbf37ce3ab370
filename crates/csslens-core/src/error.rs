//! Error types for csslens.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required identifier was absent from the request.
    #[error("Missing {0}")]
    MissingInput(&'static str),

    #[error("No API key set")]
    NoCredential,

    /// The page could not be scraped (unknown tab, failed delivery).
    #[error("{0}")]
    Extraction(String),

    /// Non-success response (or no response) from the interpretation service.
    #[error("{0}")]
    Remote(String),

    /// The interpretation service replied with something that is not the expected JSON.
    #[error("Failed to parse model response: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_texts() {
        assert_eq!(Error::MissingInput("tabId").to_string(), "Missing tabId");
        assert_eq!(Error::NoCredential.to_string(), "No API key set");
        assert_eq!(
            Error::Remote("Claude API error: 500".into()).to_string(),
            "Claude API error: 500"
        );
    }
}
