//! Courier
//!
//! A descriptor-driven REST request engine. Endpoint descriptors (see
//! [`courier_define`]) say where each argument goes and how an operation
//! authenticates; this crate turns a descriptor plus a caller's
//! [`ArgumentBag`] into exactly one outgoing request and normalizes whatever
//! comes back.
//!
//! ## Pipeline
//!
//! 1. [`request::partition`] splits the bag into path, query, header, body and sql destinations
//! 2. [`auth::select`] picks a [`Provider`] from descriptor metadata and the bag's `security` entry
//! 3. [`request::PreparedRequest`] renders the URL and body; the provider attaches credentials
//! 4. [`ApiClient`] sends the request once, or [`GatewayClient`] hands it to an integration gateway
//! 5. [`response`] normalizes data and errors into one shape
//!
//! Every configuration and validation error is raised before any network I/O.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use courier::prelude::*;
//! use serde_json::json;
//! use url::Url;
//!
//! let descriptor = EndpointDescriptor::new("get", "/users/{id}")
//!     .with_parameter(ParameterDescriptor::path("id"))
//!     .with_security_definition("oauth2", SecurityDefinition::of_kind("oauth2"));
//!
//! let client = ApiClient::builder()
//!     .base_url(Url::parse("https://api.example.com/v1")?)
//!     .build()?;
//!
//! let bag = ArgumentBag::try_from(json!({
//!     "id": "42",
//!     "security": { "token": "abc" }
//! }))?;
//!
//! let user = client.execute(&descriptor, &bag).await?;
//! ```

pub mod auth;
pub mod bag;
pub mod client;
pub mod error;
pub mod gateway;
pub mod prelude;
pub mod request;
pub mod response;

pub use auth::Provider;
pub use bag::ArgumentBag;
pub use client::{ApiClient, ApiClientBuilder, CallOptions, Outcome, Requester};
pub use error::{ApiError, ErrorObject};
pub use gateway::{GatewayClient, GatewayHandler, GatewayRequest};

pub use courier_define;
