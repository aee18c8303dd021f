//! # HTTP Transport
//!
//! The socket-level collaborator drivers talk through. [`Transport`] is the
//! object-safe seam (swap it for a recording fake or a proxy-aware client);
//! [`HttpClient`] layers JSON encoding, default headers, the context deadline
//! and status handling on top.

use crate::context::Context;
use crate::error::{ErrorKind, FieldError, PaymentError, PaymentResult, ValidationError};
use crate::signature::basic_auth;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const USER_AGENT: &str = concat!("payment-gateway-client/", env!("CARGO_PKG_VERSION"));

/// Outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// Sets a header, replacing any earlier value with the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn basic_auth(self, user: &str, pass: &str) -> Self {
        self.header("Authorization", basic_auth(user, pass))
    }

    /// Serialises `body` as JSON
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> PaymentResult<Self> {
        let encoded = serde_json::to_vec(body)
            .map_err(|e| PaymentError::InvalidPayload(format!("failed to encode request: {}", e)))?;
        self.body = Some(Bytes::from(encoded));
        Ok(self)
    }

    /// Pre-encoded body, sent byte for byte
    pub fn raw_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response as read off the wire
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes a request and reads the body fully. No retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> PaymentResult<HttpResponse>;
}

pub type BoxedTransport = Arc<dyn Transport>;

/// Default transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> PaymentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::NetworkError(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> PaymentResult<HttpResponse> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| PaymentError::InvalidParameter(format!("header name: {}", e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| PaymentError::InvalidParameter(format!("header value: {}", e)))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        PaymentError::Timeout(err.to_string())
    } else {
        PaymentError::NetworkError(err.to_string())
    }
}

/// Turns a status >= 400 response into the driver's error
pub type ErrorDecoder = fn(status: u16, body: &[u8]) -> PaymentError;

/// JSON-over-HTTP helper owned by each driver
#[derive(Clone)]
pub struct HttpClient {
    transport: BoxedTransport,
    timeout: Duration,
    decode_error: ErrorDecoder,
}

impl HttpClient {
    pub fn new(transport: BoxedTransport, timeout: Duration, decode_error: ErrorDecoder) -> Self {
        Self {
            transport,
            timeout,
            decode_error,
        }
    }

    pub fn with_transport(mut self, transport: BoxedTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `request` with the default headers under `ctx`
    pub async fn send(&self, ctx: &Context, request: HttpRequest) -> PaymentResult<HttpResponse> {
        let mut request = request
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT);
        if request.body.is_some() && request.header_value("Content-Type").is_none() {
            request = request.header("Content-Type", "application/json");
        }

        debug!(method = %request.method, url = %request.url, "dispatching gateway request");
        let response = ctx
            .run(self.timeout, self.transport.execute(request))
            .await?;
        debug!(status = response.status, "gateway responded");

        if response.status >= 400 {
            return Err((self.decode_error)(response.status, &response.body));
        }
        Ok(response)
    }

    /// Sends and decodes the body into `T`
    pub async fn call<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: HttpRequest,
    ) -> PaymentResult<T> {
        let response = self.send(ctx, request).await?;
        decode_json(&response.body)
    }

    /// Like [`call`](Self::call) but also returns the undecoded JSON
    pub async fn call_with_raw<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: HttpRequest,
    ) -> PaymentResult<(T, Value)> {
        let response = self.send(ctx, request).await?;
        let raw: Value = decode_json(&response.body)?;
        let typed = serde_json::from_value(raw.clone())
            .map_err(|e| PaymentError::InvalidPayload(format!("unexpected response shape: {}", e)))?;
        Ok((typed, raw))
    }
}

pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> PaymentResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| PaymentError::InvalidPayload(format!("failed to parse response: {}", e)))
}

/// Parses a driver base URL; it must be able to carry path segments
pub fn parse_base_url(raw: &str) -> PaymentResult<Url> {
    let url = Url::parse(raw.trim_end_matches('/')).map_err(|e| {
        PaymentError::InvalidConfiguration(ValidationError::from(FieldError::new(
            "ApiBaseUrl",
            e.to_string(),
            ErrorKind::InvalidParameter,
        )))
    })?;
    if url.cannot_be_a_base() {
        return Err(PaymentError::InvalidConfiguration(ValidationError::from(
            FieldError::new("ApiBaseUrl", "must be an http(s) URL", ErrorKind::InvalidParameter),
        )));
    }
    Ok(url)
}

/// Appends percent-encoded path segments to `base`
pub fn endpoint(base: &Url, segments: &[&str]) -> String {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde::Deserialize;

    struct Canned {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for Canned {
        async fn execute(&self, request: HttpRequest) -> PaymentResult<HttpResponse> {
            self.seen.lock().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: HeaderMap::new(),
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    fn decode(status: u16, body: &[u8]) -> PaymentError {
        PaymentError::InvalidPayload(format!("{} {}", status, String::from_utf8_lossy(body)))
    }

    #[derive(Debug, Deserialize)]
    struct Echo {
        id: String,
    }

    #[tokio::test]
    async fn test_default_headers_and_decode() {
        let transport = Arc::new(Canned {
            status: 200,
            body: r#"{"id":"T1"}"#,
            seen: Mutex::new(Vec::new()),
        });
        let client = HttpClient::new(transport.clone(), Duration::from_secs(5), decode);

        let req = HttpRequest::post("https://example.test/v2/charge")
            .basic_auth("key", "")
            .json(&serde_json::json!({"a": 1}))
            .unwrap();
        let (echo, raw): (Echo, Value) = client
            .call_with_raw(&Context::background(), req)
            .await
            .unwrap();

        assert_eq!(echo.id, "T1");
        assert_eq!(raw["id"], "T1");

        let seen = transport.seen.lock();
        let sent = &seen[0];
        assert_eq!(sent.header_value("content-type"), Some("application/json"));
        assert_eq!(sent.header_value("Accept"), Some("application/json"));
        assert!(sent.header_value("User-Agent").unwrap().starts_with("payment-gateway-client/"));
        assert_eq!(sent.header_value("Authorization"), Some("Basic a2V5Og=="));
    }

    #[tokio::test]
    async fn test_error_status_uses_decoder() {
        let transport = Arc::new(Canned {
            status: 404,
            body: "missing",
            seen: Mutex::new(Vec::new()),
        });
        let client = HttpClient::new(transport, Duration::from_secs(5), decode);
        let err = client
            .call::<Echo>(&Context::background(), HttpRequest::get("https://example.test"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid payload: 404 missing");
    }

    #[tokio::test]
    async fn test_bad_json_is_invalid_payload() {
        let transport = Arc::new(Canned {
            status: 200,
            body: "<html>",
            seen: Mutex::new(Vec::new()),
        });
        let client = HttpClient::new(transport, Duration::from_secs(5), decode);
        let err = client
            .call::<Echo>(&Context::background(), HttpRequest::get("https://example.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidPayload(_)));
    }

    #[test]
    fn test_header_replaces_case_insensitively() {
        let req = HttpRequest::get("u").header("X-Test", "1").header("x-test", "2");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header_value("X-TEST"), Some("2"));
    }

    #[test]
    fn test_endpoint_joins_and_encodes_segments() {
        let base = parse_base_url("https://api.sandbox.midtrans.com/").unwrap();
        assert_eq!(
            endpoint(&base, &["v2", "ORDER 1", "status"]),
            "https://api.sandbox.midtrans.com/v2/ORDER%201/status"
        );

        let proxied = parse_base_url("http://127.0.0.1:9000/proxy").unwrap();
        assert_eq!(endpoint(&proxied, &["v2", "charge"]), "http://127.0.0.1:9000/proxy/v2/charge");
    }

    #[test]
    fn test_bad_base_url() {
        let err = parse_base_url("mailto:ops@example.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }
}
