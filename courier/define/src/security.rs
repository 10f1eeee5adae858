//! Security metadata attached to endpoint descriptors.
//!
//! Two shapes reach the engine:
//!
//! - `securityDefinitions`: an ordered map of named strategy configurations
//!   (Swagger 2.0 style). The first entry decides the implied strategy.
//! - `security`: either an explicit override object carrying a `type`, or a
//!   Swagger requirement list (`[{ "api_key": [] }]`) naming definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named strategy configurations, in declaration order.
pub type SecurityDefinitions = IndexMap<String, SecurityDefinition>;

/// One entry of `securityDefinitions`.
///
/// Only `type`, `name` and `in` matter to the engine. Everything else
/// (`authorizationUrl`, `flow`, `scopes`, ...) is kept untouched in `extra`.
///
/// ## Examples
///
/// ```
/// use courier_define::SecurityDefinition;
///
/// let def: SecurityDefinition = serde_json::from_value(serde_json::json!({
///     "type": "apiKey",
///     "name": "access_token",
///     "in": "query"
/// })).unwrap();
///
/// assert_eq!(def.kind.as_deref(), Some("apiKey"));
/// assert_eq!(def.location.as_deref(), Some("query"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityDefinition {
    /// Strategy tag (`apiKey`, `basic`, `oauth2`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Header or query parameter name for API keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// API key location (`header` or `query`).
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Remaining strategy metadata.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SecurityDefinition {
    /// Creates a definition with only a strategy tag.
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Creates an API key definition.
    pub fn api_key(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            kind: Some("apiKey".to_string()),
            name: Some(name.into()),
            location: Some(location.into()),
            extra: Map::new(),
        }
    }
}

/// Explicit strategy override carried in a descriptor's `security` field.
///
/// `kind` is optional only so that a malformed override (an object with no
/// `type`) can be reported instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// Strategy tag.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// API key name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// API key location override.
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// The `security` field of a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointSecurity {
    /// Swagger requirement list; each entry maps a definition name to scopes.
    Requirements(Vec<Map<String, Value>>),
    /// Explicit override object.
    Scheme(SecurityScheme),
}

impl EndpointSecurity {
    /// Builds an explicit override with the given strategy tag.
    pub fn scheme(kind: impl Into<String>) -> Self {
        Self::Scheme(SecurityScheme {
            kind: Some(kind.into()),
            ..SecurityScheme::default()
        })
    }

    /// Names referenced by a requirement list, in order. Empty for overrides.
    pub fn requirement_names(&self) -> Vec<&str> {
        match self {
            Self::Requirements(entries) => entries
                .iter()
                .flat_map(|entry| entry.keys().map(String::as_str))
                .collect(),
            Self::Scheme(_) => Vec::new(),
        }
    }
}
