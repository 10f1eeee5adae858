//! Raw payloads as they arrive from a backend.

use bytes::Bytes;
use serde_json::Value;

use crate::error::ValidationError;

/// A success or failure payload before normalization.
///
/// HTTP responses arrive as bytes; gateways may hand back either JSON text or
/// an already-structured value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Already-decoded JSON.
    Structured(Value),
    /// JSON text.
    Text(String),
    /// Raw body bytes.
    Bytes(Bytes),
}

impl RawPayload {
    /// Decodes the payload into JSON. Blank text and empty bodies decode to `null`.
    ///
    /// ## Errors
    ///
    /// Returns [`ValidationError::JsonParse`] if textual content is not JSON.
    pub fn decode(self) -> Result<Value, ValidationError> {
        match self {
            Self::Structured(value) => Ok(value),
            Self::Text(text) if text.trim().is_empty() => Ok(Value::Null),
            Self::Text(text) => Ok(serde_json::from_str(&text)?),
            Self::Bytes(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Value::Null),
            Self::Bytes(bytes) => Ok(serde_json::from_slice(&bytes)?),
        }
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<String> for RawPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for RawPayload {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}
