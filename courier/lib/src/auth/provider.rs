//! Authentication providers.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{AuthError, ConfigError};
use crate::request::PreparedRequest;

/// Where an API key travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
}

impl ApiKeyLocation {
    /// Parses a location string.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidApiKeyLocation`] for anything other than
    /// `header` or `query`.
    pub fn parse(location: &str) -> Result<Self, ConfigError> {
        location
            .parse()
            .map_err(|_| ConfigError::InvalidApiKeyLocation {
                location: location.to_string(),
            })
    }
}

/// A credential strategy, built fresh for each call.
///
/// The `Debug` output redacts secret values.
#[derive(Clone, PartialEq, Eq)]
pub enum Provider {
    /// Static key sent as a header or query parameter.
    ApiKey {
        name: String,
        value: String,
        location: ApiKeyLocation,
    },
    /// HTTP basic authentication.
    Basic { username: String, password: String },
    /// OAuth access token sent as `Authorization: Bearer <token>`.
    Bearer { token: String },
}

impl Provider {
    /// Short name of the strategy, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey { .. } => "api-key",
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
        }
    }

    /// Attaches the credentials to `request`.
    ///
    /// ## Errors
    ///
    /// Returns [`AuthError::AuthenticationApplyFailed`] if the credentials
    /// cannot be expressed as a valid header. The request is left unchanged.
    pub fn apply(&self, request: &mut PreparedRequest) -> Result<(), AuthError> {
        match self {
            Self::ApiKey {
                name,
                value,
                location: ApiKeyLocation::Header,
            } => {
                HeaderName::try_from(name.as_str())
                    .map_err(|e| AuthError::apply_failed(format!("api key header '{name}': {e}")))?;
                checked_value(value)?;
                request.set_header(name.as_str(), value.as_str());
            }
            Self::ApiKey {
                name,
                value,
                location: ApiKeyLocation::Query,
            } => request.append_query(name, value),
            Self::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                request.set_header(AUTHORIZATION.as_str(), format!("Basic {encoded}"));
            }
            Self::Bearer { token } => {
                let header = format!("Bearer {token}");
                checked_value(&header)?;
                request.set_header(AUTHORIZATION.as_str(), header);
            }
        }
        Ok(())
    }
}

fn checked_value(value: &str) -> Result<(), AuthError> {
    HeaderValue::try_from(value)
        .map(|_| ())
        .map_err(|e| AuthError::apply_failed(format!("credential is not valid header text: {e}")))
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { name, location, .. } => f
                .debug_struct("ApiKey")
                .field("name", name)
                .field("location", location)
                .field("value", &"[redacted]")
                .finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[redacted]")
                .finish(),
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[redacted]")
                .finish(),
        }
    }
}
