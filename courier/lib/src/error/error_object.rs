//! The uniform `{code, message}` error shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ApiError;

/// Error value delivered through completion callbacks.
///
/// `code` is the HTTP (or gateway) status when the failure carries one and is
/// omitted from the serialized form otherwise.
///
/// ## Examples
///
/// ```rust
/// use courier::error::ErrorObject;
///
/// let err = ErrorObject::new(Some(404), "Not Found");
/// assert_eq!(
///     serde_json::to_value(&err).unwrap(),
///     serde_json::json!({ "code": 404, "message": "Not Found" })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ErrorObject {
    /// Status code, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Human-readable message.
    pub message: String,
}

impl ErrorObject {
    /// Creates an error object.
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&ApiError> for ErrorObject {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Client(client) => Self::new(client.status_code(), client.message()),
            other => Self::new(None, other.to_string()),
        }
    }
}

impl From<ApiError> for ErrorObject {
    fn from(err: ApiError) -> Self {
        Self::from(&err)
    }
}
