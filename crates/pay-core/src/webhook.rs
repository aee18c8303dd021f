//! # Inbound Webhooks
//!
//! [`WebhookRequest`] holds an inbound notification with its body already
//! buffered. Verifiers and parsers borrow the same bytes, so reading the
//! body to check a signature never starves the parser that runs after it.

use crate::error::{PaymentError, PaymentResult};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    headers: HeaderMap,
    body: Bytes,
}

impl WebhookRequest {
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Convenience for tests and adapters without a `HeaderMap` at hand
    pub fn from_parts<'a>(
        headers: impl IntoIterator<Item = (&'a str, &'a str)>,
        body: impl Into<Bytes>,
    ) -> PaymentResult<Self> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| PaymentError::InvalidPayload(format!("header name: {}", e)))?;
            let value = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| PaymentError::InvalidPayload(format!("header value: {}", e)))?;
            map.insert(name, value);
        }
        Ok(Self::new(map, body))
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header as UTF-8; `None` when absent or not valid text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_bytes(&self) -> Bytes {
        self.body.clone()
    }

    pub fn is_form(&self) -> bool {
        self.header("content-type")
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false)
    }

    /// Body as a flat JSON object; form bodies become string fields
    pub fn fields(&self) -> PaymentResult<Map<String, Value>> {
        if self.is_form() {
            return Ok(url::form_urlencoded::parse(&self.body)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect());
        }
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(PaymentError::InvalidPayload(
                "webhook body is not a JSON object".to_string(),
            )),
            Err(e) => Err(PaymentError::InvalidPayload(format!(
                "failed to parse webhook body: {}",
                e
            ))),
        }
    }
}

/// Signature strategy used to gate webhook parsing.
///
/// Implementations must only borrow the buffered body.
pub trait WebhookVerifier: Send + Sync {
    fn verify(&self, request: &WebhookRequest) -> bool;
}

/// String field that may arrive as a JSON string or number
pub fn field_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
