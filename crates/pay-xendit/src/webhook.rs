//! # Xendit Callbacks
//!
//! Xendit signs nothing; it echoes the account's callback verification
//! token in `X-Callback-Token`. Three body shapes arrive on the same URL:
//!
//! - invoice callbacks (`external_id`, `status`)
//! - callback virtual account payments (`callback_virtual_account_id`)
//! - e-wallet charge events (`event`, `data`)

use crate::mapper::{amount_value, map_status, parse_time, payment_type_from_code};
use chrono::Utc;
use pay_core::signature::consteq;
use pay_core::webhook::field_string;
use pay_core::{
    PaymentError, PaymentResult, Status, WebhookEvent, WebhookRequest, WebhookVerifier,
};
use serde_json::{Map, Value};

pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

/// Constant-time comparison of the callback token header
#[derive(Clone)]
pub struct CallbackTokenVerifier {
    token: String,
}

impl CallbackTokenVerifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl WebhookVerifier for CallbackTokenVerifier {
    fn verify(&self, request: &WebhookRequest) -> bool {
        if self.token.is_empty() {
            return false;
        }
        match request.header(CALLBACK_TOKEN_HEADER) {
            Some(received) => consteq(self.token.as_bytes(), received.as_bytes()),
            None => false,
        }
    }
}

pub fn parse_callback(request: &WebhookRequest) -> PaymentResult<WebhookEvent> {
    let fields = request.fields()?;

    let mut event = if let Some(name) = field_string(&fields, "event") {
        parse_ewallet_event(&name, &fields)?
    } else if fields.contains_key("callback_virtual_account_id") {
        parse_va_payment(&fields)?
    } else if fields.contains_key("external_id") && fields.contains_key("status") {
        parse_invoice(&fields)?
    } else {
        return Err(PaymentError::InvalidWebhookType(
            "unrecognised callback shape".to_string(),
        ));
    };

    event.raw = fields;
    Ok(event)
}

fn parse_ewallet_event(name: &str, fields: &Map<String, Value>) -> PaymentResult<WebhookEvent> {
    if !matches!(name, "ewallet.capture" | "ewallet.void") {
        return Err(PaymentError::InvalidWebhookType(name.to_string()));
    }
    let data = fields
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| PaymentError::InvalidPayload("e-wallet event has no data".to_string()))?;

    let order_id = required(data, "reference_id")?;
    let status = field_string(data, "status")
        .map(|s| map_status(&s))
        .unwrap_or(Status::Pending);
    let amount = data
        .get("capture_amount")
        .or_else(|| data.get("charge_amount"))
        .and_then(amount_value)
        .unwrap_or(0);

    let mut event = WebhookEvent::new(
        order_id,
        field_string(data, "id").unwrap_or_default(),
        status,
        amount,
    );
    event.payment_type = field_string(data, "channel_code")
        .as_deref()
        .and_then(payment_type_from_code);
    event.timestamp = field_string(data, "updated")
        .or_else(|| field_string(fields, "created"))
        .as_deref()
        .and_then(parse_time)
        .unwrap_or_else(Utc::now);
    Ok(event)
}

fn parse_va_payment(fields: &Map<String, Value>) -> PaymentResult<WebhookEvent> {
    let order_id = required(fields, "external_id")?;
    let transaction_id = field_string(fields, "payment_id")
        .or_else(|| field_string(fields, "id"))
        .unwrap_or_default();
    let amount = fields.get("amount").and_then(amount_value).unwrap_or(0);

    // a callback VA payment notification only exists once money arrived
    let mut event = WebhookEvent::new(order_id, transaction_id, Status::Success, amount);
    event.payment_type = field_string(fields, "bank_code")
        .as_deref()
        .and_then(payment_type_from_code);
    event.timestamp = field_string(fields, "transaction_timestamp")
        .as_deref()
        .and_then(parse_time)
        .unwrap_or_else(Utc::now);
    Ok(event)
}

fn parse_invoice(fields: &Map<String, Value>) -> PaymentResult<WebhookEvent> {
    let order_id = required(fields, "external_id")?;
    let status = map_status(&required(fields, "status")?);
    let amount = fields
        .get("paid_amount")
        .or_else(|| fields.get("amount"))
        .and_then(amount_value)
        .unwrap_or(0);

    let mut event = WebhookEvent::new(
        order_id,
        field_string(fields, "id").unwrap_or_default(),
        status,
        amount,
    );
    event.payment_type = field_string(fields, "payment_channel")
        .or_else(|| field_string(fields, "payment_method"))
        .as_deref()
        .and_then(payment_type_from_code);
    event.timestamp = field_string(fields, "paid_at")
        .or_else(|| field_string(fields, "updated"))
        .as_deref()
        .and_then(parse_time)
        .unwrap_or_else(Utc::now);
    Ok(event)
}

fn required(fields: &Map<String, Value>, key: &str) -> PaymentResult<String> {
    field_string(fields, key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PaymentError::InvalidPayload(format!("callback is missing {}", key)))
}
