//! HTTP dispatch and the completion contract.

mod executor;
mod requester;

pub use executor::{ApiClient, ApiClientBuilder, CallOptions};
pub use requester::{Outcome, Requester, deliver};
