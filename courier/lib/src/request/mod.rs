//! Turning a descriptor and an argument bag into an outgoing request.
//!
//! - [`partition`] splits the bag into path, query, header, body and sql destinations
//! - [`PreparedRequest`] renders a partition into an absolute URL, headers and an encoded body

mod partition;
mod prepared;

use std::str::FromStr;

use courier_define::RestMethod;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

use crate::error::ConfigError;

pub use partition::{Body, Partition, partition, partition_template};
pub use prepared::{PreparedRequest, RequestBody, transport_method};

/// Characters left unescaped by `encodeURIComponent`. Used for path values,
/// query pairs and query-string credentials alike.
pub(crate) const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Resolves a descriptor's method string, ignoring case.
///
/// ## Errors
///
/// Returns [`ConfigError::UnsupportedMethod`] for methods with no transport
/// binding (`TRACE`, `CONNECT`, typos).
pub fn resolve_method(method: &str) -> Result<RestMethod, ConfigError> {
    RestMethod::from_str(method.trim()).map_err(|_| ConfigError::UnsupportedMethod {
        method: method.to_string(),
    })
}
