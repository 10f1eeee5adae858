//! Layered error types for the request engine.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`ApiError`] - Top-level error type for all operations
//! - [`ClientError`] - Transport failures (network, timeout, non-2xx, gateway)
//! - [`ValidationError`] - Bad caller input and undecodable payloads
//! - [`AuthError`] - Credential problems
//! - [`ConfigError`] - Descriptor and client configuration problems
//!
//! Every error collapses into the uniform [`ErrorObject`] (`{code, message}`)
//! delivered through completion callbacks.

mod api_error;
mod auth_error;
mod client_error;
mod config_error;
mod error_object;
mod validation_error;

pub use api_error::ApiError;
pub use auth_error::AuthError;
pub use client_error::ClientError;
pub use config_error::ConfigError;
pub use error_object::ErrorObject;
pub use validation_error::ValidationError;
