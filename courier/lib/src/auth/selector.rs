//! Choosing an authentication provider from descriptor metadata.

use std::str::FromStr;

use courier_define::{EndpointDescriptor, EndpointSecurity, SecurityDefinition, SecurityDefinitions};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use tracing::debug;

use super::provider::{ApiKeyLocation, Provider};
use crate::bag::{ArgumentBag, render};
use crate::error::{ApiError, AuthError, ConfigError};

/// Authentication families recognised in descriptor metadata.
///
/// Type strings are matched exactly; `apiKey` and `api-key` are both
/// accepted, as are the three OAuth spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum AuthKind {
    #[strum(serialize = "api-key", serialize = "apiKey")]
    ApiKey,
    #[strum(serialize = "basic")]
    Basic,
    #[strum(serialize = "oauth", serialize = "oauth2", serialize = "oauth_2_0")]
    OAuth,
}

/// The strategy a descriptor asks for, before credentials are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub kind: AuthKind,
    /// API key name, from the override or the definition.
    pub name: Option<&'a str>,
    /// API key location, from the override or the definition.
    pub location: Option<&'a str>,
}

/// Works out which strategy applies, without looking at credentials.
///
/// An explicit override object wins. A requirement list picks the first
/// requirement naming an existing definition. Otherwise the first definition
/// decides, using its `type` and falling back to its key.
///
/// Only an override object is checked for a `type`. A requirement list never
/// carries one and is not rejected as an invalid descriptor; it only names
/// definitions, and an unmatched list falls through to the first definition.
///
/// ## Errors
///
/// - [`ConfigError::InvalidSecurityDescriptor`] for an override with no `type`
/// - [`ConfigError::UnsupportedAuthType`] for unknown type strings
pub fn resolve<'a>(
    security: Option<&'a EndpointSecurity>,
    definitions: &'a SecurityDefinitions,
) -> Result<Option<Resolution<'a>>, ConfigError> {
    if let Some(EndpointSecurity::Scheme(scheme)) = security {
        let kind = scheme.kind.as_deref().ok_or_else(|| {
            ConfigError::invalid_security("Security parameter must have a property 'type'")
        })?;
        let fallback = definitions.values().next();
        return Ok(Some(Resolution {
            kind: parse_kind(kind)?,
            name: scheme
                .name
                .as_deref()
                .or_else(|| fallback.and_then(|def| def.name.as_deref())),
            location: scheme
                .location
                .as_deref()
                .or_else(|| fallback.and_then(|def| def.location.as_deref())),
        }));
    }

    let required = security.and_then(|security| {
        security
            .requirement_names()
            .into_iter()
            .find_map(|name| definitions.get_key_value(name))
    });

    let Some((key, definition)) = required.or_else(|| definitions.first()) else {
        return Ok(None);
    };

    Ok(Some(from_definition(key, definition)?))
}

fn from_definition<'a>(
    key: &'a str,
    definition: &'a SecurityDefinition,
) -> Result<Resolution<'a>, ConfigError> {
    Ok(Resolution {
        kind: parse_kind(definition.kind.as_deref().unwrap_or(key))?,
        name: definition.name.as_deref(),
        location: definition.location.as_deref(),
    })
}

fn parse_kind(kind: &str) -> Result<AuthKind, ConfigError> {
    AuthKind::from_str(kind).map_err(|_| ConfigError::UnsupportedAuthType {
        kind: kind.to_string(),
    })
}

/// Builds the provider for one call.
///
/// `metadata` is the caller's credential object: `{value}` for API keys,
/// `{username, password}` for basic and `{token}` for OAuth. Returns `None`
/// when the descriptor declares no security at all.
///
/// Selection is a pure function of its inputs.
///
/// ## Errors
///
/// Configuration errors from [`resolve`], plus:
/// - [`ConfigError::InvalidApiKeyLocation`] when an API key location is not `header` or `query`
/// - [`ConfigError::InvalidSecurityDescriptor`] when an API key has no name
/// - [`AuthError::MissingApiKey`] / [`AuthError::MissingToken`] when credentials are absent
pub fn select(
    security: Option<&EndpointSecurity>,
    definitions: &SecurityDefinitions,
    metadata: Option<&Map<String, Value>>,
) -> Result<Option<Provider>, ApiError> {
    let Some(resolution) = resolve(security, definitions)? else {
        debug!("no security declared, sending anonymously");
        return Ok(None);
    };

    let field = |name: &str| {
        metadata
            .and_then(|metadata| metadata.get(name))
            .filter(|value| !value.is_null())
            .map(render)
    };

    let provider = match resolution.kind {
        AuthKind::ApiKey => {
            let location = ApiKeyLocation::parse(resolution.location.unwrap_or_default())?;
            let name = resolution
                .name
                .ok_or_else(|| ConfigError::invalid_security("api key security must have a 'name'"))?;
            let value = field("value").ok_or_else(|| AuthError::MissingApiKey {
                name: name.to_string(),
            })?;
            Provider::ApiKey {
                name: name.to_string(),
                value,
                location,
            }
        }
        AuthKind::Basic => Provider::Basic {
            username: field("username").unwrap_or_default(),
            password: field("password").unwrap_or_default(),
        },
        AuthKind::OAuth => Provider::Bearer {
            token: field("token").ok_or(AuthError::MissingToken)?,
        },
    };

    debug!(kind = provider.kind(), "selected authentication provider");
    Ok(Some(provider))
}

/// Selects the provider for a descriptor using the bag's `security` entry.
pub fn select_for(
    descriptor: &EndpointDescriptor,
    bag: &ArgumentBag,
) -> Result<Option<Provider>, ApiError> {
    select(
        descriptor.security.as_ref(),
        &descriptor.security_definitions,
        bag.security(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_define::SecurityScheme;
    use serde_json::json;

    fn defs(value: Value) -> SecurityDefinitions {
        serde_json::from_value(value).unwrap()
    }

    fn meta(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn kind_strings_are_case_sensitive() {
        for kind in ["api-key", "apiKey"] {
            assert_eq!(AuthKind::from_str(kind).unwrap(), AuthKind::ApiKey);
        }
        for kind in ["oauth", "oauth2", "oauth_2_0"] {
            assert_eq!(AuthKind::from_str(kind).unwrap(), AuthKind::OAuth);
        }
        assert_eq!(AuthKind::from_str("basic").unwrap(), AuthKind::Basic);
        assert!(AuthKind::from_str("Basic").is_err());
        assert!(AuthKind::from_str("OAuth2").is_err());
    }

    #[test]
    fn nothing_declared_is_anonymous() {
        let provider = select(None, &SecurityDefinitions::new(), None).unwrap();
        assert!(provider.is_none());
    }

    #[test]
    fn oauth2_definition_yields_bearer() {
        let definitions = defs(json!({
            "oauth2": { "type": "oauth2", "flow": "implicit" }
        }));
        let provider = select(None, &definitions, Some(&meta(json!({ "token": "abc" }))))
            .unwrap()
            .unwrap();
        assert_eq!(provider, Provider::Bearer { token: "abc".to_string() });
    }

    #[test]
    fn definition_key_is_used_when_type_missing() {
        let definitions = defs(json!({ "oauth": { "flow": "implicit" } }));
        let provider = select(None, &definitions, Some(&meta(json!({ "token": "t" }))))
            .unwrap()
            .unwrap();
        assert_eq!(provider.kind(), "bearer");
    }

    #[test]
    fn missing_token_fails() {
        let definitions = defs(json!({ "oauth2": { "type": "oauth2" } }));
        for metadata in [None, Some(meta(json!({ "token": null })))] {
            let err = select(None, &definitions, metadata.as_ref()).unwrap_err();
            assert!(matches!(err, ApiError::Auth(AuthError::MissingToken)));
        }
    }

    #[test]
    fn basic_defaults_missing_parts_to_empty() {
        let definitions = defs(json!({ "basic": { "type": "basic" } }));
        let provider = select(None, &definitions, Some(&meta(json!({ "username": "u" }))))
            .unwrap()
            .unwrap();
        assert_eq!(
            provider,
            Provider::Basic {
                username: "u".to_string(),
                password: String::new()
            }
        );
    }

    #[test]
    fn explicit_override_wins_over_definitions() {
        let definitions = defs(json!({ "oauth2": { "type": "oauth2" } }));
        let security = EndpointSecurity::scheme("basic");
        let provider = select(
            Some(&security),
            &definitions,
            Some(&meta(json!({ "username": "a", "password": "b" }))),
        )
        .unwrap()
        .unwrap();
        assert_eq!(provider.kind(), "basic");
    }

    #[test]
    fn override_without_type_is_invalid() {
        let security = EndpointSecurity::Scheme(SecurityScheme::default());
        let err = select(Some(&security), &SecurityDefinitions::new(), None).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Config(ConfigError::InvalidSecurityDescriptor { .. })
        ));
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let definitions = defs(json!({ "hmac": { "type": "hmac" } }));
        let err = select(None, &definitions, None).unwrap_err();
        assert!(
            matches!(err, ApiError::Config(ConfigError::UnsupportedAuthType { ref kind }) if kind == "hmac")
        );
    }

    #[test]
    fn requirement_list_picks_named_definition() {
        let definitions = defs(json!({
            "instagram_auth": { "type": "oauth2", "flow": "implicit" },
            "api_key": { "type": "apiKey", "in": "query", "name": "access_token" }
        }));
        let security: EndpointSecurity =
            serde_json::from_value(json!([{ "missing": [] }, { "api_key": [] }])).unwrap();

        let provider = select(
            Some(&security),
            &definitions,
            Some(&meta(json!({ "value": "tok" }))),
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            provider,
            Provider::ApiKey {
                name: "access_token".to_string(),
                value: "tok".to_string(),
                location: ApiKeyLocation::Query,
            }
        );
    }

    #[test]
    fn unmatched_requirements_fall_back_to_first_definition() {
        let definitions = defs(json!({ "instagram_auth": { "type": "oauth2" } }));
        let security: EndpointSecurity =
            serde_json::from_value(json!([{ "nope": [] }])).unwrap();
        let resolution = resolve(Some(&security), &definitions).unwrap().unwrap();
        assert_eq!(resolution.kind, AuthKind::OAuth);
    }

    #[test]
    fn requirement_list_is_not_checked_for_type() {
        let security: EndpointSecurity = serde_json::from_value(json!([{ "nope": [] }])).unwrap();
        let definitions = SecurityDefinitions::new();
        let resolution = resolve(Some(&security), &definitions).unwrap();
        assert!(resolution.is_none());
    }

    #[test]
    fn api_key_override_supplies_name_and_location() {
        let definitions = defs(json!({ "api_key": { "type": "apiKey", "in": "query", "name": "key" } }));
        let security = EndpointSecurity::Scheme(SecurityScheme {
            kind: Some("api-key".to_string()),
            name: Some("X-Api-Key".to_string()),
            location: Some("header".to_string()),
        });
        let provider = select(
            Some(&security),
            &definitions,
            Some(&meta(json!({ "value": 42 }))),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            provider,
            Provider::ApiKey {
                name: "X-Api-Key".to_string(),
                value: "42".to_string(),
                location: ApiKeyLocation::Header,
            }
        );
    }

    #[test]
    fn api_key_with_bad_location_fails() {
        let definitions = defs(json!({ "k": { "type": "apiKey", "in": "cookie", "name": "key" } }));
        let err = select(None, &definitions, Some(&meta(json!({ "value": "v" })))).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Config(ConfigError::InvalidApiKeyLocation { ref location }) if location == "cookie"
        ));
    }

    #[test]
    fn api_key_without_name_fails() {
        let definitions = defs(json!({ "k": { "type": "apiKey", "in": "header" } }));
        let err = select(None, &definitions, Some(&meta(json!({ "value": "v" })))).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Config(ConfigError::InvalidSecurityDescriptor { .. })
        ));
    }

    #[test]
    fn api_key_without_value_fails() {
        let definitions = defs(json!({ "k": { "type": "apiKey", "in": "header", "name": "X-Key" } }));
        let err = select(None, &definitions, None).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Auth(AuthError::MissingApiKey { ref name }) if name == "X-Key"
        ));
    }

    #[test]
    fn selection_is_idempotent() {
        let definitions = defs(json!({
            "api_key": { "type": "apiKey", "in": "query", "name": "access_token" }
        }));
        let metadata = meta(json!({ "value": "k" }));
        let first = select(None, &definitions, Some(&metadata)).unwrap();
        let second = select(None, &definitions, Some(&metadata)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn select_for_reads_bag_security() {
        let descriptor = EndpointDescriptor::new("get", "/me")
            .with_security_definition("oauth2", SecurityDefinition::of_kind("oauth2"));
        let bag = ArgumentBag::new().with("security", json!({ "token": "abc" }));
        let provider = select_for(&descriptor, &bag).unwrap().unwrap();
        assert_eq!(provider, Provider::Bearer { token: "abc".to_string() });
    }
}
