//! Response and error normalization.
//!
//! Both the HTTP dispatcher and the gateway client funnel their outcomes
//! through these functions, so callers see one data shape and one error shape
//! whichever backend served the call.

mod payload;

use serde_json::{Map, Value};

use crate::error::{ErrorObject, ValidationError};

pub use payload::RawPayload;

/// Keys that may carry a failure's status code, in priority order.
const CODE_KEYS: [&str; 3] = ["httpStatus", "status", "code"];

/// Normalizes a success payload.
///
/// Textual payloads are JSON-decoded; structured payloads pass through, so a
/// JSON string and the value it encodes normalize identically.
///
/// ## Errors
///
/// Returns [`ValidationError::JsonParse`] if a textual payload is not JSON.
///
/// ## Examples
///
/// ```
/// use courier::response::{RawPayload, normalize_response};
/// use serde_json::json;
///
/// let from_text = normalize_response(RawPayload::from(r#"{"id":1}"#)).unwrap();
/// let from_value = normalize_response(RawPayload::from(json!({ "id": 1 }))).unwrap();
/// assert_eq!(from_text, from_value);
/// ```
pub fn normalize_response(payload: RawPayload) -> Result<Value, ValidationError> {
    payload.decode()
}

/// Normalizes a failure payload into `{code, message}`.
///
/// The code comes from `httpStatus`, then `status`, then `code`. The message
/// is `"<message>: <errorType>"` when both fields exist, otherwise whichever
/// one does. Payloads with neither report their JSON text.
///
/// ## Errors
///
/// Returns [`ValidationError::JsonParse`] if a textual payload is not JSON.
pub fn normalize_error(payload: RawPayload) -> Result<ErrorObject, ValidationError> {
    Ok(match payload.decode()? {
        Value::Object(map) => ErrorObject::new(code(&map), message(&map)),
        Value::String(message) => ErrorObject::new(None, message),
        other => ErrorObject::new(None, other.to_string()),
    })
}

fn code(map: &Map<String, Value>) -> Option<u16> {
    CODE_KEYS.iter().find_map(|key| match map.get(*key)? {
        Value::Number(number) => number.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(text) => text.parse().ok(),
        _ => None,
    })
}

fn message(map: &Map<String, Value>) -> String {
    let text = |key: &str| {
        map.get(key)
            .filter(|value| !value.is_null())
            .map(crate::bag::render)
    };

    match (text("message"), text("errorType")) {
        (Some(message), Some(error_type)) => format!("{message}: {error_type}"),
        (Some(message), None) => message,
        (None, Some(error_type)) => error_type,
        (None, None) => Value::Object(map.clone()).to_string(),
    }
}

/// Unwraps a gateway response envelope.
///
/// Gateways wrap data as `{responseData, responseHeaders}`; older ones spell
/// it `resposeData`. Anything else is returned unchanged.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            match map
                .remove("responseData")
                .or_else(|| map.remove("resposeData"))
            {
                Some(data) => data,
                None => Value::Object(map),
            }
        }
        other => other,
    }
}
