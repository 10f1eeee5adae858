//! Authentication errors.

use thiserror::Error;

/// Errors related to credentials.
///
/// These occur while building a provider from the caller's `security`
/// metadata or while applying it to an outgoing request. Either way nothing
/// has been sent yet.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A bearer strategy was selected but no token was supplied.
    #[error("To use oauth you should provide access token")]
    MissingToken,

    /// An API key strategy was selected but no key value was supplied.
    #[error("Missing API key value for '{name}'")]
    MissingApiKey {
        /// The header or query parameter the key was meant for.
        name: String,
    },

    /// The provider could not attach its credentials to the request.
    #[error("Authentication build failed: {message}")]
    AuthenticationApplyFailed {
        /// Why the credentials could not be attached.
        message: String,
    },
}

impl AuthError {
    /// Creates an apply failure.
    pub fn apply_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationApplyFailed {
            message: message.into(),
        }
    }
}
