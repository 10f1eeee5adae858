//! The completion contract shared by every backend.

use std::future::Future;

use courier_define::{DescriptorTable, EndpointDescriptor};
use serde_json::Value;
use tracing::warn;

use crate::bag::ArgumentBag;
use crate::error::{ApiError, ConfigError, ErrorObject};

/// What a completion callback receives: data on success, `{code, message}`
/// on failure. Never both.
pub type Outcome = Result<Value, ErrorObject>;

/// A backend that can execute descriptor-driven calls.
///
/// Implementors provide [`execute`](Self::execute) and their descriptor table;
/// the callback-style methods are derived from it and fire their callback
/// exactly once.
pub trait Requester: Sync {
    /// Executes one call.
    fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        bag: &ArgumentBag,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// The operations this backend knows by id.
    fn descriptors(&self) -> &DescriptorTable;

    /// Executes the operation registered under `operation`.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::UnknownOperation`] if no such operation exists,
    /// otherwise whatever [`execute`](Self::execute) returns.
    fn execute_operation(
        &self,
        operation: &str,
        bag: &ArgumentBag,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send {
        async move {
            let descriptor = lookup(self.descriptors(), operation)?;
            self.execute(descriptor, bag).await
        }
    }

    /// Executes one call and hands the outcome to `callback`.
    fn call<F>(
        &self,
        descriptor: &EndpointDescriptor,
        bag: &ArgumentBag,
        callback: F,
    ) -> impl Future<Output = ()> + Send
    where
        F: FnOnce(Outcome) + Send,
    {
        async move { deliver(self.execute(descriptor, bag).await, callback) }
    }

    /// Executes the operation registered under `operation` and hands the
    /// outcome to `callback`. Unknown operations are reported through the
    /// callback like any other failure.
    fn call_operation<F>(
        &self,
        operation: &str,
        bag: &ArgumentBag,
        callback: F,
    ) -> impl Future<Output = ()> + Send
    where
        F: FnOnce(Outcome) + Send,
    {
        async move { deliver(self.execute_operation(operation, bag).await, callback) }
    }
}

fn lookup<'a>(
    table: &'a DescriptorTable,
    operation: &str,
) -> Result<&'a EndpointDescriptor, ConfigError> {
    table
        .get(operation)
        .ok_or_else(|| ConfigError::UnknownOperation {
            id: operation.to_string(),
        })
}

/// Converts a result into an [`Outcome`] and invokes `callback` with it.
///
/// Taking the callback by value is what guarantees it runs once.
pub fn deliver<F>(result: Result<Value, ApiError>, callback: F)
where
    F: FnOnce(Outcome),
{
    let outcome = result.map_err(|err| {
        warn!(error = %err, "request failed");
        ErrorObject::from(&err)
    });
    callback(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn deliver_success() {
        let calls = AtomicUsize::new(0);
        deliver(Ok(json!({ "id": 1 })), |outcome| {
            calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(outcome, Ok(json!({ "id": 1 })));
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deliver_failure_as_error_object() {
        let calls = AtomicUsize::new(0);
        let err = ClientError::HttpStatus {
            status: 404,
            message: "Not Found".to_string(),
            body: String::new(),
        };
        deliver(Err(err.into()), |outcome| {
            calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(outcome, Err(ErrorObject::new(Some(404), "Not Found")));
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lookup_unknown_operation() {
        let err = lookup(&DescriptorTable::new(), "getMedia").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOperation { ref id } if id == "getMedia"));
    }
}
