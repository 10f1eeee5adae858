//! Gateway-backed requester.

use std::sync::Arc;

use courier_define::{DescriptorTable, EndpointDescriptor};
use serde_json::Value;
use tracing::{instrument, warn};

use super::{GatewayHandler, GatewayRequest};
use crate::bag::ArgumentBag;
use crate::client::Requester;
use crate::error::{ApiError, ClientError};
use crate::response::{normalize_error, normalize_response, unwrap_envelope};

/// Routes descriptor-driven calls through a [`GatewayHandler`].
#[derive(Debug, Clone)]
pub struct GatewayClient<H> {
    handler: H,
    connector: Value,
    descriptors: Arc<DescriptorTable>,
}

impl<H: GatewayHandler> GatewayClient<H> {
    /// Creates a client for `handler`, forwarding `connector` with every call.
    pub fn new(handler: H, connector: Value) -> Self {
        Self {
            handler,
            connector,
            descriptors: Arc::new(DescriptorTable::new()),
        }
    }

    /// Sets the descriptor table operations are looked up in.
    pub fn with_descriptors(mut self, descriptors: DescriptorTable) -> Self {
        self.descriptors = Arc::new(descriptors);
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn connector(&self) -> &Value {
        &self.connector
    }
}

impl<H: GatewayHandler> Requester for GatewayClient<H> {
    #[instrument(
        name = "gateway_request",
        skip(self, descriptor, bag),
        fields(request_id = descriptor.request_id())
    )]
    async fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        bag: &ArgumentBag,
    ) -> Result<Value, ApiError> {
        let request = GatewayRequest::build(descriptor, bag)?;

        match self
            .handler
            .handle(&self.connector, request, descriptor.request_id())
            .await
        {
            Ok(payload) => Ok(unwrap_envelope(normalize_response(payload)?)),
            Err(payload) => {
                let error = normalize_error(payload)?;
                warn!(code = error.code, message = %error.message, "gateway reported failure");
                Err(ClientError::Gateway {
                    code: error.code,
                    message: error.message,
                }
                .into())
            }
        }
    }

    fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorObject;
    use crate::response::RawPayload;
    use courier_define::ParameterDescriptor;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGateway {
        outcome: Result<RawPayload, RawPayload>,
        seen: Mutex<Vec<(Value, GatewayRequest, String)>>,
    }

    impl StubGateway {
        fn new(outcome: Result<RawPayload, RawPayload>) -> Self {
            Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl GatewayHandler for StubGateway {
        async fn handle(
            &self,
            connector: &Value,
            request: GatewayRequest,
            request_id: &str,
        ) -> Result<RawPayload, RawPayload> {
            self.seen
                .lock()
                .unwrap()
                .push((connector.clone(), request, request_id.to_string()));
            self.outcome.clone()
        }
    }

    fn descriptor() -> EndpointDescriptor {
        EndpointDescriptor::new("get", "path")
            .with_parameter(ParameterDescriptor::header("x-vendor-authorization").required())
            .with_parameter(ParameterDescriptor::header("x-vendor-serverAddress").required())
    }

    fn args() -> ArgumentBag {
        ArgumentBag::new()
            .with("x-vendor-authorization", "auth")
            .with("x-vendor-serverAddress", "base_mailchimp")
    }

    #[tokio::test]
    async fn success_unwraps_envelope() {
        let data = json!({ "data": [{ "name": "Test List" }], "returnedCount": 1 });
        let gateway = StubGateway::new(Ok(RawPayload::Structured(json!({
            "resposeData": data.clone(),
            "resposeHeaders": { "Content-type": "application/json" }
        }))));
        let client = GatewayClient::new(gateway, json!({ "key": "mailchimp" }));

        let result = client.execute(&descriptor(), &args()).await.unwrap();
        assert_eq!(result, data);

        let seen = client.handler().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, json!({ "key": "mailchimp" }));
        assert_eq!(seen[0].1.headers["x-vendor-authorization"], "Bearer auth");
        assert_eq!(seen[0].2, "operation");
    }

    #[tokio::test]
    async fn failure_text_is_normalized() {
        let gateway = StubGateway::new(Err(RawPayload::from(
            r#"{"httpStatus":400,"message":"Request failed","errorType":"Bad Request"}"#,
        )));
        let client = GatewayClient::new(gateway, Value::Null);

        let calls = AtomicUsize::new(0);
        client
            .call(&descriptor(), &args(), |outcome| {
                calls.fetch_add(1, Ordering::SeqCst);
                assert_eq!(
                    outcome,
                    Err(ErrorObject::new(Some(400), "Request failed: Bad Request"))
                );
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn operation_id_is_request_id() {
        let gateway = StubGateway::new(Ok(RawPayload::from("[]")));
        let mut table = DescriptorTable::new();
        table.insert("listLists", descriptor().with_operation_id("listLists"));
        let client = GatewayClient::new(gateway, Value::Null).with_descriptors(table);

        let result = client.execute_operation("listLists", &args()).await.unwrap();
        assert_eq!(result, json!([]));
        assert_eq!(client.handler().seen.lock().unwrap()[0].2, "listLists");
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_gateway() {
        let gateway = StubGateway::new(Ok(RawPayload::from("{}")));
        let client = GatewayClient::new(gateway, Value::Null);

        let result = client.execute(&descriptor(), &ArgumentBag::new()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(client.handler().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn undecodable_failure_is_parse_error() {
        let gateway = StubGateway::new(Err(RawPayload::from("gateway exploded")));
        let client = GatewayClient::new(gateway, Value::Null);

        let result = client.execute(&descriptor(), &args()).await;
        assert!(matches!(result, Err(ApiError::Validation(ref e)) if e.is_parse_error()));
    }
}
