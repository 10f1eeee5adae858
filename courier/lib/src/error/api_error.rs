//! Top-level error type.

use super::{AuthError, ClientError, ConfigError, ErrorObject, ValidationError};
use thiserror::Error;

/// Top-level error type for all request-engine operations.
///
/// This enum aggregates all error categories, enabling unified error handling
/// while preserving the ability to match on specific error types when needed.
///
/// ## Examples
///
/// ```rust
/// use courier::error::{ApiError, ValidationError};
///
/// let err: ApiError = ValidationError::missing("id").into();
/// assert!(err.is_pre_flight());
/// assert_eq!(err.to_error_object().code, None);
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failures (network, timeout, non-2xx, gateway failure).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Invalid caller input or undecodable payloads.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Credential problems.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Descriptor or client configuration problems.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// The status code carried by the error, if any.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Client(err) => err.status_code(),
            _ => None,
        }
    }

    /// Returns `true` for errors raised before any network I/O was attempted.
    ///
    /// Decode failures of a received payload are the one validation error that
    /// happens after the network call.
    pub fn is_pre_flight(&self) -> bool {
        match self {
            Self::Client(_) => false,
            Self::Validation(err) => !err.is_parse_error(),
            Self::Auth(_) | Self::Config(_) => true,
        }
    }

    /// Collapses the error into the uniform `{code, message}` shape.
    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject::from(self)
    }
}
