//! Splitting an argument bag into request destinations.
//!
//! Partitioning is a pure read of the bag. Every entry ends up in exactly one
//! destination (path, query, header, body, sql) or in
//! [`Partition::remaining`], and the reserved `security` entry is left for the
//! authentication selector.

use std::collections::HashSet;

use courier_define::{EndpointDescriptor, ParameterLocation, RestMethod, placeholders};
use percent_encoding::utf8_percent_encode;
use serde_json::{Map, Value};
use tracing::debug;

use super::COMPONENT;
use crate::bag::{ArgumentBag, SECURITY_KEY, is_empty, render};
use crate::error::ValidationError;

/// Header names whose values are sent as bearer credentials.
const BEARER_HEADERS: [&str; 2] = ["x-vendor-authorization", "Authorization"];

/// Where the request body came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The value of a declared `body` parameter.
    Declared(Value),
    /// Every unconsumed bag entry, for write methods with no `body` parameter.
    Collected(Map<String, Value>),
}

impl Body {
    /// The body as a single JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Declared(value) => value.clone(),
            Self::Collected(map) => Value::Object(map.clone()),
        }
    }

    /// The declared body value, if the body came from a `body` parameter.
    pub fn declared(&self) -> Option<&Value> {
        match self {
            Self::Declared(value) => Some(value),
            Self::Collected(_) => None,
        }
    }
}

/// The bag split into request destinations.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// The method the partition was built for.
    pub method: RestMethod,
    /// The template as declared, placeholders intact.
    pub template: String,
    /// The template with each placeholder's first occurrence substituted.
    ///
    /// Values are percent-encoded as single path segments, so `/`, `?` and
    /// `#` inside a value never change the shape of the URL.
    pub resolved: String,
    /// Placeholder values in template order, unencoded.
    pub path_values: Vec<(String, String)>,
    /// Query pairs in declaration order, unencoded.
    pub query_values: Vec<(String, String)>,
    /// Header pairs in declaration order.
    pub header_values: Vec<(String, String)>,
    /// Request body, if any.
    pub body: Option<Body>,
    /// Concatenated `sql` parameter values.
    pub sql: String,
    /// Bag entries no destination consumed, in bag order.
    ///
    /// For GET-style methods this includes every key the descriptor does not
    /// declare; those keys are dropped. Write methods without a declared
    /// `body` parameter instead send undeclared keys in the body, so
    /// `remaining` is then empty.
    pub remaining: Vec<String>,
}

/// Partitions `bag` against the descriptor's `uri`, or its `path` when no
/// `uri` is declared.
///
/// ## Errors
///
/// Returns [`ValidationError::MissingRequiredParameter`] for the first
/// placeholder (in template order) with no non-empty value, or for a required
/// query, header or body parameter with neither a value nor a default.
pub fn partition(
    descriptor: &EndpointDescriptor,
    method: RestMethod,
    bag: &ArgumentBag,
) -> Result<Partition, ValidationError> {
    partition_template(descriptor, descriptor.template(), method, bag)
}

/// Partitions `bag` against an explicit template.
pub fn partition_template(
    descriptor: &EndpointDescriptor,
    template: &str,
    method: RestMethod,
    bag: &ArgumentBag,
) -> Result<Partition, ValidationError> {
    let mut consumed: HashSet<&str> = HashSet::new();
    consumed.insert(SECURITY_KEY);

    let mut path_values = Vec::new();
    for token in placeholders(template) {
        let value = bag
            .get(token)
            .filter(|value| !is_empty(value))
            .ok_or_else(|| ValidationError::missing(token))?;
        path_values.push((token.to_string(), render(value)));
        consumed.insert(token);
    }

    let mut query_values = Vec::new();
    let mut header_values = Vec::new();
    let mut body = None;
    let mut sql = String::new();

    for parameter in &descriptor.parameters {
        let name = parameter.name.as_str();
        if path_values.iter().any(|(token, _)| token == name) {
            continue;
        }
        let value = bag.value(name);

        match parameter.location {
            ParameterLocation::Header => match value {
                Some(value) => {
                    let mut text = render(value);
                    if BEARER_HEADERS.contains(&name) {
                        text = format!("Bearer {text}");
                    }
                    header_values.push((name.to_string(), text));
                    consumed.insert(name);
                }
                None if parameter.required => return Err(ValidationError::missing(name)),
                None => {}
            },
            ParameterLocation::Query => match value.or(parameter.default.as_ref()) {
                Some(resolved) => {
                    query_values.push((name.to_string(), render(resolved)));
                    if value.is_some() {
                        consumed.insert(name);
                    }
                }
                None if parameter.required => return Err(ValidationError::missing(name)),
                None => {}
            },
            ParameterLocation::Body => match value {
                Some(value) => {
                    body = Some(Body::Declared(value.clone()));
                    consumed.insert(name);
                }
                None if parameter.required => return Err(ValidationError::missing(name)),
                None => {}
            },
            ParameterLocation::Sql => {
                if let Some(value) = value {
                    sql.push_str(&render(value));
                    consumed.insert(name);
                }
            }
            ParameterLocation::Path | ParameterLocation::FormData => {}
        }
    }

    if body.is_none() && method.has_body() {
        let collected: Map<String, Value> = bag
            .iter()
            .filter(|(name, _)| !consumed.contains(name))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        consumed.extend(bag.keys());
        body = Some(Body::Collected(collected));
    }

    let remaining: Vec<String> = bag
        .keys()
        .filter(|name| !consumed.contains(name))
        .map(str::to_string)
        .collect();

    debug!(
        template,
        path = path_values.len(),
        query = query_values.len(),
        headers = header_values.len(),
        has_body = body.is_some(),
        dropped = remaining.len(),
        "partitioned arguments"
    );

    let encoded: Vec<(String, String)> = path_values
        .iter()
        .map(|(name, value)| {
            let segment = utf8_percent_encode(value, COMPONENT).to_string();
            (name.clone(), segment)
        })
        .collect();

    Ok(Partition {
        method,
        template: template.to_string(),
        resolved: substitute(template, &encoded),
        path_values,
        query_values,
        header_values,
        body,
        sql,
        remaining,
    })
}

/// Replaces the first occurrence of each `{token}` with its value.
///
/// Substituted text is never rescanned, so values that themselves look like
/// placeholders are never expanded.
fn substitute(template: &str, values: &[(String, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut done: HashSet<&str> = HashSet::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open..].find('}') else {
            break;
        };
        let token = &rest[open + 1..open + len];
        out.push_str(&rest[..open]);
        match values.iter().find(|(name, _)| name == token) {
            Some((name, value)) if !done.contains(name.as_str()) => {
                out.push_str(value);
                done.insert(name.as_str());
            }
            _ => out.push_str(&rest[open..=open + len]),
        }
        rest = &rest[open + len + 1..];
    }
    out.push_str(rest);
    out
}
