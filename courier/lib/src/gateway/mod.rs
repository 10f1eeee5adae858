//! Dispatch through a third-party integration gateway.
//!
//! Instead of issuing HTTP calls itself, the engine can hand each partitioned
//! call to a [`GatewayHandler`] along with an opaque connector descriptor. The
//! gateway's success and failure payloads are normalized exactly like HTTP
//! responses, so [`GatewayClient`] offers the same
//! [`Requester`](crate::client::Requester) contract as
//! [`ApiClient`](crate::client::ApiClient).

mod client;
mod request;

use std::future::Future;

use serde_json::Value;

use crate::response::RawPayload;

pub use client::GatewayClient;
pub use request::{GatewayOperation, GatewayRequest};

/// A gateway that executes partitioned calls.
///
/// `connector` is passed through untouched. `request_id` is the descriptor's
/// operation id, or `"operation"` when it has none.
pub trait GatewayHandler: Send + Sync {
    /// Executes one request, resolving to the success payload or the failure payload.
    fn handle(
        &self,
        connector: &Value,
        request: GatewayRequest,
        request_id: &str,
    ) -> impl Future<Output = Result<RawPayload, RawPayload>> + Send;
}
