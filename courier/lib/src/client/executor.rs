//! Request execution with tracing instrumentation.
//!
//! This module provides the [`ApiClient`] struct for dispatching
//! descriptor-driven HTTP requests with authentication and tracing.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use courier_define::{DescriptorTable, EndpointDescriptor};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{Span, debug, instrument, warn};
use url::{Position, Url};

use super::requester::{Outcome, Requester, deliver};
use crate::auth::select_for;
use crate::bag::ArgumentBag;
use crate::error::{ApiError, ClientError, ConfigError, ValidationError};
use crate::request::{PreparedRequest, partition, resolve_method};
use crate::response::{RawPayload, normalize_response};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Abandon the call if no response arrives within this duration.
    pub deadline: Option<Duration>,
}

impl CallOptions {
    /// Sets the per-call deadline.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Builder for configuring an [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: Option<Url>,
    timeout: Duration,
    default_headers: HeaderMap,
    descriptors: DescriptorTable,
}

impl ApiClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
            descriptors: DescriptorTable::new(),
        }
    }

    /// Sets the URL that `path` templates are resolved against.
    ///
    /// Descriptors with a fully-qualified `uri` ignore it.
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the client-wide request timeout.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// use std::time::Duration;
    ///
    /// let client = ApiClient::builder()
    ///     .timeout(Duration::from_secs(60))
    ///     .build()?;
    /// ```
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a default header to all requests.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ApiError> {
        let name = name.as_ref();
        let invalid = |message: String| ValidationError::InvalidHeader {
            name: name.to_string(),
            message,
        };
        let header_name = HeaderName::try_from(name).map_err(|e| invalid(e.to_string()))?;
        let header_value =
            HeaderValue::try_from(value.as_ref()).map_err(|e| invalid(e.to_string()))?;
        self.default_headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Sets the descriptor table operations are looked up in.
    pub fn descriptors(mut self, descriptors: DescriptorTable) -> Self {
        self.descriptors = descriptors;
        self
    }

    /// Loads the descriptor table from a JSON or YAML file.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Definition`] if the file cannot be read, parsed
    /// or validated.
    pub fn descriptors_from_path(self, path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let table = DescriptorTable::from_path(path).map_err(ConfigError::from)?;
        Ok(self.descriptors(table))
    }

    /// Builds the [`ApiClient`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(ClientError::Request)?;

        Ok(ApiClient {
            client,
            base_url: self.base_url,
            descriptors: Arc::new(self.descriptors),
        })
    }
}

/// Async HTTP backend for descriptor-driven calls.
///
/// The client wraps a pooled `reqwest::Client`. Each call partitions the
/// argument bag, selects an authentication provider, validates everything and
/// only then sends exactly one request. Nothing is retried.
///
/// ## Examples
///
/// ```rust,ignore
/// use courier::prelude::*;
/// use serde_json::json;
/// use url::Url;
///
/// let client = ApiClient::builder()
///     .base_url(Url::parse("https://api.example.com")?)
///     .descriptors_from_path("conf/descriptors.json")?
///     .build()?;
///
/// let bag = ArgumentBag::try_from(json!({ "id": "42" }))?;
/// let user = client.execute_operation("getUser", &bag).await?;
///
/// client
///     .call_operation("getUser", &bag, |outcome| match outcome {
///         Ok(data) => println!("{data}"),
///         Err(err) => eprintln!("{}: {}", err.code.unwrap_or_default(), err.message),
///     })
///     .await;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Option<Url>,
    descriptors: Arc<DescriptorTable>,
}

impl ApiClient {
    /// Creates a new builder for configuring an API client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Returns the base URL for this client, if one is set.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Builds, authenticates and validates the request for one call without
    /// sending it.
    ///
    /// ## Errors
    ///
    /// Every configuration, validation and authentication error a call can
    /// produce is raised here, before any network I/O.
    pub fn prepare(
        &self,
        descriptor: &EndpointDescriptor,
        bag: &ArgumentBag,
    ) -> Result<PreparedRequest, ApiError> {
        let method = resolve_method(&descriptor.method)?;
        let partition = partition(descriptor, method, bag)?;
        let provider = select_for(descriptor, bag)?;

        let mut request =
            PreparedRequest::build(&partition, self.base_url.as_ref(), descriptor.content_type())?;
        if let Some(provider) = &provider {
            provider.apply(&mut request)?;
        }
        Ok(request)
    }

    /// Executes a call with per-call options.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The descriptor, bag or credentials are invalid (nothing is sent)
    /// - The request fails (network, timeout, deadline)
    /// - The server returns a non-success status code
    /// - The response body is not JSON
    #[instrument(
        name = "api_request",
        skip(self, descriptor, bag, options),
        fields(
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn execute_with(
        &self,
        descriptor: &EndpointDescriptor,
        bag: &ArgumentBag,
        options: CallOptions,
    ) -> Result<Value, ApiError> {
        let request = self.prepare(descriptor, bag)?;

        Span::current().record("http.method", request.method.to_string().as_str());
        // Query strings may carry API keys.
        Span::current().record("http.url", &request.url[..Position::AfterPath]);

        let builder = request.into_reqwest(&self.client)?;

        match options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, send(builder))
                .await
                .map_err(|_| {
                    warn!(deadline_ms = millis(deadline), "deadline expired");
                    ClientError::Timeout {
                        duration_ms: millis(deadline),
                    }
                })?,
            None => send(builder).await,
        }
    }

    /// Executes a call with per-call options and hands the outcome to
    /// `callback`, which runs exactly once.
    pub async fn call_with<F>(
        &self,
        descriptor: &EndpointDescriptor,
        bag: &ArgumentBag,
        options: CallOptions,
        callback: F,
    ) where
        F: FnOnce(Outcome),
    {
        deliver(self.execute_with(descriptor, bag, options).await, callback);
    }
}

impl Requester for ApiClient {
    async fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        bag: &ArgumentBag,
    ) -> Result<Value, ApiError> {
        self.execute_with(descriptor, bag, CallOptions::default())
            .await
    }

    fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }
}

/// Sends the request once and normalizes the response.
async fn send(builder: reqwest::RequestBuilder) -> Result<Value, ApiError> {
    // URLs can carry query-string credentials; keep them out of errors and logs.
    let response = builder.send().await.map_err(|e| {
        let e = e.without_url();
        warn!(error = %e, "transport failure");
        ClientError::Request(e)
    })?;

    let status = response.status();
    let status_code = status.as_u16();

    Span::current().record("http.status_code", status_code);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        let otel_status = if status.is_server_error() {
            "ERROR"
        } else {
            "UNSET"
        };
        Span::current().record("otel.status_code", otel_status);
        warn!(status = status_code, "non-success status");

        return Err(ClientError::HttpStatus {
            status: status_code,
            message: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
            body,
        }
        .into());
    }

    Span::current().record("otel.status_code", "OK");

    let body = response
        .bytes()
        .await
        .map_err(|e| ClientError::Request(e.without_url()))?;
    debug!(bytes = body.len(), "received response");
    Ok(normalize_response(RawPayload::Bytes(body))?)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_define::{ParameterDescriptor, SecurityDefinition};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::builder()
            .base_url(Url::parse(&server.uri()).unwrap())
            .build()
            .unwrap()
    }

    fn bag(value: Value) -> ArgumentBag {
        ArgumentBag::try_from(value).unwrap()
    }

    #[tokio::test]
    async fn test_execute_get_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "name": "Alice"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("get", "/users/{id}")
            .with_parameter(ParameterDescriptor::path("id"));

        let result = client_for(&mock_server)
            .execute(&descriptor, &bag(json!({ "id": 1 })))
            .await
            .unwrap();
        assert_eq!(result, json!({ "id": 1, "name": "Alice" }));
    }

    #[tokio::test]
    async fn test_post_sends_collected_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/media/7/comments"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "text": "nice shot" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("post", "/media/{media-id}/comments")
            .with_parameter(ParameterDescriptor::path("media-id"));

        let result = client_for(&mock_server)
            .execute(
                &descriptor,
                &bag(json!({ "media-id": "7", "text": "nice shot" })),
            )
            .await
            .unwrap();
        assert_eq!(result, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_api_key_in_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/self"))
            .and(query_param("access_token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("get", "/users/self").with_security_definition(
            "api_key",
            SecurityDefinition::api_key("access_token", "query"),
        );

        let result = client_for(&mock_server)
            .execute(
                &descriptor,
                &bag(json!({ "security": { "value": "secret" } })),
            )
            .await
            .unwrap();
        assert_eq!(result, json!({ "data": {} }));
    }

    #[tokio::test]
    async fn test_basic_auth_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/account"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("get", "/account")
            .with_security_definition("basic", SecurityDefinition::of_kind("basic"));

        client_for(&mock_server)
            .execute(
                &descriptor,
                &bag(json!({ "security": { "username": "user", "password": "pass" } })),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_http_error_500_keeps_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/server-error"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("get", "/server-error");
        let result = client_for(&mock_server)
            .execute(&descriptor, &ArgumentBag::new())
            .await;

        match result {
            Err(ApiError::Client(ClientError::HttpStatus {
                status,
                message,
                body,
            })) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_special() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/private"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token"))
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("get", "/private");
        let result = client_for(&mock_server)
            .execute(&descriptor, &ArgumentBag::new())
            .await;
        assert!(matches!(
            result,
            Err(ApiError::Client(ClientError::HttpStatus { status: 401, .. }))
        ));
    }

    #[tokio::test]
    async fn test_json_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/invalid-json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("get", "/invalid-json");
        let result = client_for(&mock_server)
            .execute(&descriptor, &ArgumentBag::new())
            .await;
        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::JsonParse(_)))
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/media/3"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("delete", "/media/{id}")
            .with_parameter(ParameterDescriptor::path("id"));
        let result = client_for(&mock_server)
            .execute(&descriptor, &bag(json!({ "id": 3 })))
            .await
            .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("get", "/slow");
        let result = client_for(&mock_server)
            .execute_with(
                &descriptor,
                &ArgumentBag::new(),
                CallOptions::default().deadline(Duration::from_millis(50)),
            )
            .await;
        assert!(matches!(
            result,
            Err(ApiError::Client(ClientError::Timeout { duration_ms: 50 }))
        ));
    }

    #[tokio::test]
    async fn test_call_with_deadline_reaches_callback_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let calls = std::sync::atomic::AtomicUsize::new(0);
        let descriptor = EndpointDescriptor::new("get", "/slow");
        client_for(&mock_server)
            .call_with(
                &descriptor,
                &ArgumentBag::new(),
                CallOptions::default().deadline(Duration::from_millis(50)),
                |outcome| {
                    calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    let err = outcome.unwrap_err();
                    assert_eq!(err.code, None);
                    assert_eq!(err.message, "Request timeout after 50ms");
                },
            )
            .await;

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsupported_method_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("TRACE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("trace", "/anything");
        let result = client_for(&mock_server)
            .execute(&descriptor, &ArgumentBag::new())
            .await;
        assert!(matches!(
            result,
            Err(ApiError::Config(ConfigError::UnsupportedMethod { .. }))
        ));
    }

    #[test]
    fn test_prepare_without_base_url() {
        let client = ApiClient::builder().build().unwrap();
        let descriptor = EndpointDescriptor::new("get", "/users");
        let err = client.prepare(&descriptor, &ArgumentBag::new()).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Config(ConfigError::MissingField { field: "base_url" })
        ));
    }

    #[test]
    fn test_prepare_absolute_uri_without_base_url() {
        let client = ApiClient::builder().build().unwrap();
        let descriptor = EndpointDescriptor::new("get", "/users/self")
            .with_uri("https://api.instagram.com/v1/users/self");
        let request = client.prepare(&descriptor, &ArgumentBag::new()).unwrap();
        assert_eq!(
            request.url.as_str(),
            "https://api.instagram.com/v1/users/self"
        );
    }

    #[test]
    fn test_invalid_default_header() {
        let result = ApiClient::builder().default_header("bad header", "v");
        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::InvalidHeader { .. }))
        ));
    }

    #[tokio::test]
    async fn test_default_header_is_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/with-header"))
            .and(header("x-client", "courier"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::builder()
            .base_url(Url::parse(&mock_server.uri()).unwrap())
            .default_header("X-Client", "courier")
            .unwrap()
            .build()
            .unwrap();

        let descriptor = EndpointDescriptor::new("get", "/with-header");
        let result = client.execute(&descriptor, &ArgumentBag::new()).await.unwrap();
        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_credentials_stay_out_of_logs() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/self"))
            .and(query_param("access_token", "very-secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("get", "/users/self").with_security_definition(
            "api_key",
            SecurityDefinition::api_key("access_token", "query"),
        );

        client_for(&mock_server)
            .execute(
                &descriptor,
                &bag(json!({ "security": { "value": "very-secret-key" } })),
            )
            .await
            .unwrap();

        assert!(logs_contain("selected authentication provider"));
        assert!(logs_contain("partitioned arguments"));
        assert!(!logs_contain("very-secret-key"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_failure_is_logged() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let descriptor = EndpointDescriptor::new("get", "/missing");
        let _ = client_for(&mock_server)
            .execute(&descriptor, &ArgumentBag::new())
            .await;

        assert!(logs_contain("non-success status"));
    }
}
