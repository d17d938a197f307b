//! Error types.
//!
//! Nothing in the engine surfaces an error to the visitor. These errors
//! describe the recoverable situations that make a feature (or a single
//! element) drop out silently, so callers can log them.

use thiserror::Error;

/// Errors produced while configuring or mounting the engine.
#[derive(Debug, Error)]
pub enum SiteError {
    /// The JSON configuration could not be parsed.
    #[error("invalid site configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A numeric attribute on an element held something that is not a number.
    #[error("attribute `{name}` has malformed value `{value}`")]
    MalformedAttribute { name: String, value: String },

    /// A selector matched nothing on the page.
    #[error("no element matches `{0}`")]
    MissingElement(String),

    /// The browser environment (window/document) is not reachable.
    #[error("host environment unavailable: {0}")]
    HostUnavailable(String),
}

/// Parse a non-negative index attribute such as `data-index="3"`.
pub fn parse_index_attribute(name: &str, value: &str) -> Result<usize, SiteError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| SiteError::MalformedAttribute {
            name: name.to_string(),
            value: value.to_string(),
        })
}
