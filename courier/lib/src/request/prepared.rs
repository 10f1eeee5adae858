//! Fully-resolved outgoing requests.

use courier_define::RestMethod;
use percent_encoding::utf8_percent_encode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use super::COMPONENT;
use super::partition::{Body, Partition};
use crate::bag::render;
use crate::error::{ApiError, ConfigError, ValidationError};

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Encoded request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON.
    Json(Value),
    /// Serialized as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Sent verbatim.
    Text(String),
}

impl RequestBody {
    fn encode(body: &Body, content_type: Option<&str>) -> Self {
        let value = body.to_value();
        match (content_type, value) {
            (Some(ct), Value::Object(map)) if is_form(ct) => {
                Self::Form(map.iter().map(|(k, v)| (k.clone(), render(v))).collect())
            }
            (Some(ct), Value::String(text)) if !is_json(ct) => Self::Text(text),
            (_, value) => Self::Json(value),
        }
    }

    /// The content type implied by the encoding.
    pub fn default_content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => JSON,
            Self::Form(_) => FORM,
            Self::Text(_) => "text/plain",
        }
    }

    fn into_bytes(self) -> Result<Vec<u8>, ValidationError> {
        Ok(match self {
            Self::Json(value) => serde_json::to_vec(&value)?,
            Self::Form(pairs) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish()
                .into_bytes(),
            Self::Text(text) => text.into_bytes(),
        })
    }
}

fn is_form(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().starts_with(FORM)
}

fn is_json(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.starts_with(JSON) || lower.contains("+json")
}

/// A request ready for authentication and dispatch.
///
/// Owned by exactly one call. Providers mutate it through
/// [`set_header`](Self::set_header) and [`append_query`](Self::append_query)
/// before it is handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: RestMethod,
    /// Absolute URL including the query string.
    pub url: Url,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Declared content type; falls back to the body encoding's default.
    pub content_type: Option<String>,
}

impl PreparedRequest {
    /// Builds the request from a partition.
    ///
    /// Absolute templates (`uri`) are used as-is; relative ones are appended
    /// to `base_url`.
    ///
    /// ## Errors
    ///
    /// - [`ConfigError::MissingField`] if the template is relative and no base URL is set
    /// - [`ValidationError::InvalidUrl`] if the resolved URL does not parse
    pub fn build(
        partition: &Partition,
        base_url: Option<&Url>,
        content_type: Option<&str>,
    ) -> Result<Self, ApiError> {
        let target = match Url::parse(&partition.resolved) {
            Ok(_) => partition.resolved.clone(),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = base_url.ok_or_else(|| ConfigError::missing_field("base_url"))?;
                join(base, &partition.resolved)
            }
            Err(source) => {
                return Err(ValidationError::InvalidUrl {
                    url: partition.resolved.clone(),
                    source,
                }
                .into());
            }
        };

        let url_text = with_query(target, &partition.query_values);
        let url = Url::parse(&url_text).map_err(|source| ValidationError::InvalidUrl {
            url: url_text.clone(),
            source,
        })?;

        Ok(Self {
            method: partition.method,
            url,
            headers: partition.header_values.clone(),
            body: partition
                .body
                .as_ref()
                .map(|body| RequestBody::encode(body, content_type)),
            content_type: content_type.map(str::to_string),
        })
    }

    /// Looks up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets a header, replacing any existing header with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Appends a query pair to the URL, encoded like declared query values.
    pub fn append_query(&mut self, name: &str, value: &str) {
        let pair = format!(
            "{}={}",
            utf8_percent_encode(name, COMPONENT),
            utf8_percent_encode(value, COMPONENT)
        );
        let query = match self.url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{pair}"),
            _ => pair,
        };
        self.url.set_query(Some(&query));
    }

    /// The content type that will be sent, if there is a body.
    pub fn effective_content_type(&self) -> Option<&str> {
        let body = self.body.as_ref()?;
        Some(
            self.content_type
                .as_deref()
                .unwrap_or_else(|| body.default_content_type()),
        )
    }

    /// Converts into a `reqwest` request, validating every header.
    ///
    /// ## Errors
    ///
    /// - [`ValidationError::InvalidHeader`] for header names or values that are not valid HTTP
    /// - [`ValidationError::JsonParse`] if a JSON body fails to serialize
    pub fn into_reqwest(
        self,
        client: &reqwest::Client,
    ) -> Result<reqwest::RequestBuilder, ValidationError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::try_from(name.as_str()).map_err(|e| ValidationError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            let header_value =
                HeaderValue::try_from(value.as_str()).map_err(|e| ValidationError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            headers.append(header_name, header_value);
        }

        if let Some(content_type) = self.effective_content_type() {
            if !headers.contains_key(CONTENT_TYPE) {
                let value = HeaderValue::try_from(content_type).map_err(|e| {
                    ValidationError::InvalidHeader {
                        name: CONTENT_TYPE.as_str().to_string(),
                        message: e.to_string(),
                    }
                })?;
                headers.insert(CONTENT_TYPE, value);
            }
        }

        let mut builder = client
            .request(transport_method(self.method), self.url)
            .headers(headers);
        if let Some(body) = self.body {
            builder = builder.body(body.into_bytes()?);
        }
        Ok(builder)
    }
}

/// Maps a descriptor method onto the transport's method type.
pub fn transport_method(method: RestMethod) -> reqwest::Method {
    match method {
        RestMethod::Get => reqwest::Method::GET,
        RestMethod::Post => reqwest::Method::POST,
        RestMethod::Put => reqwest::Method::PUT,
        RestMethod::Patch => reqwest::Method::PATCH,
        RestMethod::Delete => reqwest::Method::DELETE,
        RestMethod::Head => reqwest::Method::HEAD,
        RestMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn join(base: &Url, path: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

fn with_query(mut target: String, pairs: &[(String, String)]) -> String {
    for (name, value) in pairs {
        target.push(if target.contains('?') { '&' } else { '?' });
        target.extend(utf8_percent_encode(name, COMPONENT));
        target.push('=');
        target.extend(utf8_percent_encode(value, COMPONENT));
    }
    target
}
