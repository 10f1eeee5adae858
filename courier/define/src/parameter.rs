//! Parameter descriptors.
//!
//! A parameter descriptor tells the partitioner where a caller-supplied
//! argument goes on the outgoing request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Where a parameter lives on the outgoing request.
///
/// Serialized names follow the Swagger 2.0 `in` field (`formData` is
/// camelCase). `Sql` is only understood by the integration gateway backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ParameterLocation {
    /// Substituted into a `{name}` placeholder of the path template.
    Path,
    /// Appended to the query string.
    Query,
    /// Sent as an HTTP header.
    Header,
    /// The request body itself.
    Body,
    /// A field of a form-encoded body.
    FormData,
    /// A fragment of the SQL statement forwarded to SQL-backed gateway connectors.
    Sql,
}

/// Describes one parameter accepted by an endpoint.
///
/// ## Examples
///
/// ```
/// use courier_define::{ParameterDescriptor, ParameterLocation};
///
/// let id = ParameterDescriptor::path("user-id");
/// assert!(id.required);
/// assert_eq!(id.location, ParameterLocation::Path);
///
/// let count = ParameterDescriptor::query("count").with_default(20);
/// assert!(!count.required);
/// assert_eq!(count.default, Some(serde_json::json!(20)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name, unique within an endpoint.
    pub name: String,
    /// Destination of the parameter.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the caller must supply a value.
    #[serde(default)]
    pub required: bool,
    /// Semantic type hint (`string`, `integer`, ...). Informational only.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Format hint (`int32`, `double`, ...). Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value used for query parameters the caller leaves out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterDescriptor {
    /// Creates a descriptor with the given location. Path parameters are
    /// always required, everything else starts optional.
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            required: location == ParameterLocation::Path,
            kind: None,
            format: None,
            description: None,
            default: None,
        }
    }

    /// Required path parameter.
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Path).with_kind("string")
    }

    /// Optional query parameter.
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Query)
    }

    /// Optional header parameter.
    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Header)
    }

    /// Optional body parameter.
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Body)
    }

    /// Optional form field.
    pub fn form_data(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::FormData)
    }

    /// Marks the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the semantic type hint.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}
