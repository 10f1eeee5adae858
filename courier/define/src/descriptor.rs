//! Endpoint descriptors.
//!
//! An [`EndpointDescriptor`] is the static, immutable description of one
//! remote operation. Descriptor tables are usually produced from a Swagger
//! document, so the serde names follow Swagger 2.0 (`in`, `contentType`,
//! `securityDefinitions`). Keys the engine does not use, such as response
//! schemas, are ignored on load.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DefinitionError;
use crate::parameter::{ParameterDescriptor, ParameterLocation};
use crate::security::{EndpointSecurity, SecurityDefinition, SecurityDefinitions};

/// Static metadata describing one remote operation.
///
/// ## Examples
///
/// ```
/// use courier_define::{EndpointDescriptor, ParameterDescriptor, SecurityDefinition};
///
/// let get_user = EndpointDescriptor::new("get", "/users/{id}")
///     .with_uri("https://api.example.com/v1/users/{id}")
///     .with_parameter(ParameterDescriptor::path("id"))
///     .with_security_definition("oauth2", SecurityDefinition::of_kind("oauth2"));
///
/// assert_eq!(get_user.placeholders(), vec!["id"]);
/// assert!(get_user.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    /// Path template relative to the API root (`/users/{id}`).
    pub path: String,
    /// HTTP method as written in the table (`get`, `POST`, ...).
    pub method: String,
    /// Declared parameters, in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Fully-qualified URL template. Takes precedence over `path` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Declared request content types; the first one is used.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub content_type: Vec<String>,
    /// Explicit strategy override or Swagger requirement list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<EndpointSecurity>,
    /// Named strategy configurations.
    #[serde(default, skip_serializing_if = "SecurityDefinitions::is_empty")]
    pub security_definitions: SecurityDefinitions,
    /// Operation identifier, forwarded as the gateway request id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Name of the generated wrapper for this operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the remote API has deprecated this operation.
    #[serde(default)]
    pub deprecated: bool,
}

impl EndpointDescriptor {
    /// Creates a descriptor with no parameters and no security.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            parameters: Vec::new(),
            uri: None,
            content_type: Vec::new(),
            security: None,
            security_definitions: SecurityDefinitions::new(),
            operation_id: None,
            function_name: None,
            description: None,
            deprecated: false,
        }
    }

    /// Sets the fully-qualified URL template.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Appends a parameter descriptor.
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Adds a declared content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type.push(content_type.into());
        self
    }

    /// Sets the `security` field.
    pub fn with_security(mut self, security: EndpointSecurity) -> Self {
        self.security = Some(security);
        self
    }

    /// Adds a named security definition.
    pub fn with_security_definition(
        mut self,
        name: impl Into<String>,
        definition: SecurityDefinition,
    ) -> Self {
        self.security_definitions.insert(name.into(), definition);
        self
    }

    /// Sets the operation identifier.
    pub fn with_operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// The template requests are resolved against: `uri` when present,
    /// otherwise `path`.
    pub fn template(&self) -> &str {
        self.uri.as_deref().unwrap_or(&self.path)
    }

    /// Placeholder names of [`template`](Self::template), in template order.
    pub fn placeholders(&self) -> Vec<&str> {
        placeholders(self.template())
    }

    /// The content type the request body is encoded with, if declared.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.first().map(String::as_str)
    }

    /// Looks up a declared parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Identifier handed to the integration gateway for this operation.
    pub fn request_id(&self) -> &str {
        self.operation_id.as_deref().unwrap_or("operation")
    }

    /// Checks the descriptor invariants.
    ///
    /// - parameter names are unique;
    /// - every placeholder of `path` and `uri` is backed by exactly one
    ///   required `path` parameter.
    ///
    /// ## Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (index, parameter) in self.parameters.iter().enumerate() {
            if self.parameters[..index]
                .iter()
                .any(|earlier| earlier.name == parameter.name)
            {
                return Err(DefinitionError::DuplicateParameter {
                    name: parameter.name.clone(),
                });
            }
        }

        let templates = std::iter::once(self.path.as_str()).chain(self.uri.as_deref());
        for template in templates {
            for placeholder in placeholders(template) {
                let backed = self.parameters.iter().any(|p| {
                    p.name == placeholder && p.location == ParameterLocation::Path && p.required
                });
                if !backed {
                    return Err(DefinitionError::UnmatchedPlaceholder {
                        placeholder: placeholder.to_string(),
                        template: template.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Extracts `{name}` placeholder names from a template.
///
/// Names are returned in the order they first appear; repeats are skipped.
/// Empty braces and an unterminated `{` are not placeholders.
///
/// ## Examples
///
/// ```
/// use courier_define::placeholders;
///
/// let names = placeholders("/Accounts/{AccountSid}/Messages{mediaTypeExtension}");
/// assert_eq!(names, vec!["AccountSid", "mediaTypeExtension"]);
/// ```
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = &after[..close];
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
        rest = &after[close + 1..];
    }

    names
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}
