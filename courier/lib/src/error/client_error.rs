//! HTTP client and transport errors.

use thiserror::Error;

/// Errors from the transport layer.
///
/// These errors represent network-level failures, HTTP status errors and
/// failures reported by an integration gateway. They are never retried.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed due to network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned a non-success HTTP status code.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: u16,
        /// Canonical reason phrase for the status.
        message: String,
        /// Raw response body, possibly empty.
        body: String,
    },

    /// The per-call deadline expired before a response arrived.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The deadline in milliseconds.
        duration_ms: u64,
    },

    /// The integration gateway reported a failure.
    #[error("Gateway error: {message}")]
    Gateway {
        /// Status reported by the gateway, if any.
        code: Option<u16>,
        /// Normalized gateway message.
        message: String,
    },
}

impl ClientError {
    /// Returns the HTTP status code if the failure carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Gateway { code, .. } => *code,
            Self::Timeout { .. } => None,
        }
    }

    /// The message used in the uniform error shape.
    ///
    /// Status and gateway errors report their bare message; everything else
    /// reports its display text.
    pub fn message(&self) -> String {
        match self {
            Self::HttpStatus { message, .. } | Self::Gateway { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
