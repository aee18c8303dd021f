//! # Midtrans Notifications
//!
//! HTTP notifications carry a `signature_key` field:
//! `sha512(order_id + status_code + gross_amount + server_key)` in lowercase
//! hex. Fields are read from the JSON or form body.

use crate::mapper::{map_status, parse_amount, parse_wib, payment_type_from_wire, CoreResponse};
use chrono::Utc;
use pay_core::signature::{consteq, sha512};
use pay_core::webhook::field_string;
use pay_core::{PaymentError, PaymentResult, WebhookEvent, WebhookRequest, WebhookVerifier};
use serde_json::Value;
use tracing::debug;

/// Checks `signature_key` against the server key
#[derive(Clone)]
pub struct SignatureVerifier {
    server_key: String,
}

impl SignatureVerifier {
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
        }
    }

    pub fn expected_signature(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
        notification_signature(order_id, status_code, gross_amount, &self.server_key)
    }
}

impl WebhookVerifier for SignatureVerifier {
    fn verify(&self, request: &WebhookRequest) -> bool {
        let Ok(fields) = request.fields() else {
            return false;
        };
        let (Some(order_id), Some(status_code), Some(gross_amount), Some(signature)) = (
            field_string(&fields, "order_id"),
            field_string(&fields, "status_code"),
            field_string(&fields, "gross_amount"),
            field_string(&fields, "signature_key"),
        ) else {
            debug!("notification is missing signature inputs");
            return false;
        };

        let expected = self.expected_signature(&order_id, &status_code, &gross_amount);
        consteq(expected.as_bytes(), signature.to_ascii_lowercase().as_bytes())
    }
}

pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut input = String::with_capacity(
        order_id.len() + status_code.len() + gross_amount.len() + server_key.len(),
    );
    input.push_str(order_id);
    input.push_str(status_code);
    input.push_str(gross_amount);
    input.push_str(server_key);
    sha512(input.as_bytes())
}

/// Maps a notification body into the unified event
pub fn parse_notification(request: &WebhookRequest) -> PaymentResult<WebhookEvent> {
    let fields = request.fields()?;
    let raw = Value::Object(fields.clone());
    let notification: CoreResponse = serde_json::from_value(raw)
        .map_err(|e| PaymentError::InvalidPayload(format!("unexpected notification shape: {}", e)))?;

    if notification.order_id.is_empty() {
        return Err(PaymentError::InvalidPayload("notification has no order_id".to_string()));
    }
    if notification.transaction_status.is_empty() {
        return Err(PaymentError::InvalidPayload(
            "notification has no transaction_status".to_string(),
        ));
    }

    let amount = if notification.gross_amount.is_empty() {
        0
    } else {
        parse_amount(&notification.gross_amount)?
    };

    let mut event = WebhookEvent::new(
        notification.order_id.clone(),
        notification.transaction_id.clone(),
        map_status(&notification.transaction_status),
        amount,
    );
    event.payment_type = payment_type_from_wire(&notification);
    event.fraud_status = notification.fraud_status.clone();
    event.timestamp = notification
        .settlement_time
        .as_deref()
        .or(notification.transaction_time.as_deref())
        .and_then(parse_wib)
        .unwrap_or_else(Utc::now);
    event.raw = fields;
    Ok(event)
}
