//! The request shape handed to an integration gateway.

use courier_define::EndpointDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bag::ArgumentBag;
use crate::error::ApiError;
use crate::request::{Body, partition_template, resolve_method};

/// Which operation the gateway should perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOperation {
    /// Uppercase method name.
    pub method: String,
    /// The descriptor's `path`, placeholders intact.
    pub path: String,
}

/// A partitioned call, ready for a gateway.
///
/// The gateway does its own URL resolution, so the path stays templated and
/// placeholder values travel separately in `paths`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    pub operation: GatewayOperation,
    /// Placeholder values by name.
    pub paths: Map<String, Value>,
    /// Header values by name, with bearer prefixes applied.
    pub headers: Map<String, Value>,
    /// Query values by name, unencoded.
    pub query_options: Map<String, Value>,
    /// The declared `body` parameter value; only sent for write methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Concatenated `sql` parameter values.
    pub sql: String,
}

impl GatewayRequest {
    /// Partitions `bag` against the descriptor's `path`.
    ///
    /// ## Errors
    ///
    /// Returns the same configuration and validation errors as HTTP dispatch:
    /// an unsupported method or a missing required value.
    pub fn build(descriptor: &EndpointDescriptor, bag: &ArgumentBag) -> Result<Self, ApiError> {
        let method = resolve_method(&descriptor.method)?;
        let partition = partition_template(descriptor, &descriptor.path, method, bag)?;

        let body = if method.has_body() {
            partition.body.as_ref().and_then(Body::declared).cloned()
        } else {
            None
        };

        Ok(Self {
            operation: GatewayOperation {
                method: method.to_string(),
                path: descriptor.path.clone(),
            },
            paths: to_map(partition.path_values),
            headers: to_map(partition.header_values),
            query_options: to_map(partition.query_values),
            body,
            sql: partition.sql,
        })
    }
}

fn to_map(pairs: Vec<(String, String)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect()
}
