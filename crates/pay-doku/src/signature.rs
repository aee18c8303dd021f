//! # Doku Request Signatures
//!
//! Outgoing requests and incoming notifications share one recipe:
//!
//! ```text
//! digest    = hex(sha512(body))
//! component = client_id + ":" + timestamp + ":" + digest
//! Signature = client_id + ":" + hex(hmac_sha512(secret_key, component))
//! ```

use pay_core::signature::{consteq, hmac_sha512, sha512};
use pay_core::{WebhookRequest, WebhookVerifier};
use tracing::debug;

pub const CLIENT_ID_HEADER: &str = "Client-Id";
pub const REQUEST_ID_HEADER: &str = "Request-Id";
pub const REQUEST_TIMESTAMP_HEADER: &str = "Request-Timestamp";
pub const SIGNATURE_HEADER: &str = "Signature";

/// `Signature` header value for `body` sent at `timestamp` (unix seconds)
pub fn request_signature(client_id: &str, secret_key: &str, timestamp: &str, body: &[u8]) -> String {
    let component = format!("{}:{}:{}", client_id, timestamp, sha512(body));
    format!(
        "{}:{}",
        client_id,
        hmac_sha512(secret_key.as_bytes(), component.as_bytes())
    )
}

/// Recomputes the signature over the buffered notification body
#[derive(Clone)]
pub struct SignatureVerifier {
    client_id: String,
    secret_key: String,
}

impl SignatureVerifier {
    pub fn new(client_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl WebhookVerifier for SignatureVerifier {
    fn verify(&self, request: &WebhookRequest) -> bool {
        let (Some(timestamp), Some(received)) = (
            request.header(REQUEST_TIMESTAMP_HEADER),
            request.header(SIGNATURE_HEADER),
        ) else {
            debug!("notification is missing signature headers");
            return false;
        };

        let expected = request_signature(&self.client_id, &self.secret_key, timestamp, request.body());
        consteq(expected.as_bytes(), received.as_bytes())
    }
}
