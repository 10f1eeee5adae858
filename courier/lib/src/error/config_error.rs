//! Descriptor and client configuration errors.

use courier_define::DefinitionError;
use thiserror::Error;

/// Errors in descriptor metadata or client setup.
///
/// These indicate a broken descriptor table or client configuration rather
/// than bad caller input, and are always raised before any network I/O.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The descriptor's `security` object has no `type`.
    #[error("Invalid security descriptor: {message}")]
    InvalidSecurityDescriptor {
        /// What is wrong with the security metadata.
        message: String,
    },

    /// The resolved authentication type is not one the engine knows.
    #[error("Unsupported authentication type '{kind}', expected oauth, basic or api-key")]
    UnsupportedAuthType {
        /// The unrecognized type string.
        kind: String,
    },

    /// An API key definition names a location other than header or query.
    #[error(
        "The type \"{location}\" for api key authentication is invalid, it must be either \"header\" or \"query\""
    )]
    InvalidApiKeyLocation {
        /// The rejected location (empty when absent).
        location: String,
    },

    /// The descriptor's method has no transport binding.
    #[error("HTTP method {method} is not supported")]
    UnsupportedMethod {
        /// The method as written in the descriptor.
        method: String,
    },

    /// A required configuration field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// No descriptor is registered under the requested operation id.
    #[error("Unknown operation: {id}")]
    UnknownOperation {
        /// The requested operation id.
        id: String,
    },

    /// The descriptor table failed to load or validate.
    #[error("Descriptor table error: {0}")]
    Definition(#[from] DefinitionError),
}

impl ConfigError {
    /// Creates a missing field error.
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Creates an invalid security descriptor error.
    pub fn invalid_security(message: impl Into<String>) -> Self {
        Self::InvalidSecurityDescriptor {
            message: message.into(),
        }
    }
}
