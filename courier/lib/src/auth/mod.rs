//! Pluggable authentication.
//!
//! Descriptors declare which strategy an operation needs; callers supply the
//! credentials in the bag's `security` entry. [`select`] combines the two into
//! a [`Provider`], which then attaches itself to a
//! [`PreparedRequest`](crate::request::PreparedRequest).
//!
//! | Type strings | Provider | Credential fields |
//! |---|---|---|
//! | `api-key`, `apiKey` | [`Provider::ApiKey`] | `value` |
//! | `basic` | [`Provider::Basic`] | `username`, `password` |
//! | `oauth`, `oauth2`, `oauth_2_0` | [`Provider::Bearer`] | `token` |

mod provider;
mod selector;

pub use provider::{ApiKeyLocation, Provider};
pub use selector::{AuthKind, Resolution, resolve, select, select_for};
