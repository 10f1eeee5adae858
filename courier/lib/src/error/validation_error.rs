//! Caller input and payload decoding errors.

use thiserror::Error;

/// Errors in caller-supplied arguments or in received payloads.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required value is absent or empty.
    #[error("Required parameter: '{name}' must be provided")]
    MissingRequiredParameter {
        /// Name of the missing parameter.
        name: String,
    },

    /// The argument bag is not a JSON object.
    #[error("Arguments must be a JSON object")]
    ArgumentsNotObject,

    /// A header name or value cannot be sent over HTTP.
    #[error("Invalid header '{name}': {message}")]
    InvalidHeader {
        /// The offending header name.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// The resolved request URL does not parse.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        /// The URL text that failed to parse.
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A payload or body could not be encoded or decoded as JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ValidationError {
    /// Creates a missing parameter error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingRequiredParameter { name: name.into() }
    }

    /// Returns `true` if this is a decoding error.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::JsonParse(_))
    }
}
