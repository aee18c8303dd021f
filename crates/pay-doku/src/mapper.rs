//! # Doku Mapper
//!
//! Amounts go over the wire as decimal strings (`"50000"`).

use chrono::{DateTime, NaiveDateTime, Utc};
use pay_core::validation::normalize_phone;
use pay_core::{
    ChargeParams, ChargeResponse, ErrorKind, Item, PaymentError, PaymentResult, PaymentStatus,
    PaymentType, ProviderError, Status, WebhookEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::PROVIDER_NAME;

pub const CURRENCY: &str = "IDR";

const SUCCESS_CODES: [&str; 3] = ["0000", "00", "200"];

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    pub order: Order,
    pub payment: Payment,
    pub customer: CustomerInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub invoice_number: String,
    pub amount: String,
    pub currency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub name: String,
    pub price: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub payment_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub va_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_due_date: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusRequest {
    pub transaction_id: String,
}

// =============================================================================
// Responses and notifications
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DokuResponse {
    #[serde(default)]
    pub response_code: Option<String>,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub order: Option<OrderInfo>,
    #[serde(default)]
    pub payment: Option<PaymentInfo>,
    #[serde(default)]
    pub transaction: Option<TransactionInfo>,
    #[serde(default)]
    pub channel: Option<ChannelInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderInfo {
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub amount: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub va_number: Option<String>,
    #[serde(default)]
    pub qr_string: Option<String>,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub expired_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    response_code: Option<String>,
    #[serde(default)]
    response_message: Option<String>,
    #[serde(default)]
    message: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

// =============================================================================
// Unified → wire
// =============================================================================

/// Doku `payment_type` for a method class
pub fn wire_payment_type(payment_type: PaymentType) -> PaymentResult<&'static str> {
    if payment_type.is_ewallet() {
        Ok("EWALLET")
    } else if payment_type.is_qris() {
        Ok("QR_CODE")
    } else if payment_type.is_va() {
        Ok("VIRTUAL_ACCOUNT")
    } else {
        Err(PaymentError::InvalidParameter(format!(
            "{} is not available through doku",
            payment_type
        )))
    }
}

pub fn to_payment_request(params: &ChargeParams, now: DateTime<Utc>) -> PaymentResult<PaymentRequest> {
    let kind = wire_payment_type(params.payment_type)?;
    let payment = Payment {
        payment_type: kind,
        channel: params
            .payment_type
            .is_ewallet()
            .then(|| params.payment_type.as_str().to_ascii_uppercase()),
        qr_type: params.payment_type.is_qris().then_some("DYNAMIC"),
        va_type: params
            .payment_type
            .is_va()
            .then_some(params.payment_type.as_str()),
        payment_due_date: params
            .expiry_time
            .map(|expiry| ((expiry - now).num_seconds() + 59).div_euclid(60).max(1)),
    };

    Ok(PaymentRequest {
        order: Order {
            invoice_number: params.order_id.clone(),
            amount: params.amount.to_string(),
            currency: CURRENCY,
            callback_url: params.callback_url.clone(),
            line_items: params.items.iter().map(line_item).collect(),
        },
        payment,
        customer: CustomerInfo {
            id: params.customer.id.clone(),
            name: params.customer.name.clone(),
            email: params.customer.email.clone(),
            phone: normalize_phone(&params.customer.phone).unwrap_or_default(),
        },
    })
}

fn line_item(item: &Item) -> LineItem {
    LineItem {
        name: item.name.clone(),
        price: item.price.to_string(),
        quantity: item.quantity,
    }
}

// =============================================================================
// Wire → unified
// =============================================================================

pub fn map_status(status: &str) -> Status {
    match status.to_ascii_uppercase().as_str() {
        "SUCCESS" => Status::Success,
        "PENDING" => Status::Pending,
        "FAILED" => Status::Failed,
        "CANCELLED" => Status::Cancelled,
        "EXPIRED" => Status::Expired,
        _ => Status::Pending,
    }
}

pub fn amount_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().split('.').next()?.parse().ok(),
        _ => None,
    }
}

/// Doku reports `yyyyMMddHHmmss` in UTC or RFC 3339
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y%m%d%H%M%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// `VIRTUAL_ACCOUNT_BCA`, `EMONEY_OVO`, `QRIS` → unified type
pub fn payment_type_from_channel(channel: &str) -> Option<PaymentType> {
    let channel = channel.trim().to_ascii_lowercase();
    if let Some(bank) = channel
        .strip_prefix("virtual_account_")
        .or_else(|| channel.strip_prefix("va_"))
    {
        let bank = bank.strip_prefix("bank_").unwrap_or(bank);
        return PaymentType::ALL
            .into_iter()
            .find(|p| p.is_va() && p.bank_code() == Some(bank));
    }
    let name = channel
        .strip_prefix("emoney_")
        .or_else(|| channel.strip_prefix("ewallet_"))
        .unwrap_or(&channel);
    name.parse().ok()
}

/// Rejects envelopes whose `response_code` is not a success code
pub fn check_envelope(response: &DokuResponse, raw: &Value) -> PaymentResult<()> {
    match response.response_code.as_deref() {
        None => Ok(()),
        Some(code) if SUCCESS_CODES.contains(&code) => Ok(()),
        Some(code) => Err(ProviderError::new(
            PROVIDER_NAME,
            code,
            response
                .response_message
                .clone()
                .unwrap_or_else(|| "request rejected".to_string()),
        )
        .with_raw(raw.clone())
        .into()),
    }
}

pub fn to_charge_response(response: DokuResponse, raw: Value, params: &ChargeParams) -> ChargeResponse {
    let transaction = response.transaction.unwrap_or_default();
    let payment = response.payment.unwrap_or_default();
    let amount = response
        .order
        .as_ref()
        .and_then(|o| o.amount.as_ref())
        .and_then(amount_value)
        .unwrap_or(params.amount);

    let transaction_id = if transaction.id.is_empty() {
        params.order_id.clone()
    } else {
        transaction.id
    };

    let mut charge = ChargeResponse::new(transaction_id, params.order_id.clone(), amount);
    if !transaction.status.is_empty() {
        charge.status = map_status(&transaction.status);
    }
    charge.payment_url = payment.url;
    charge.qr_string = payment.qr_string;
    if payment.va_number.is_some() {
        charge.va_number = payment.va_number;
        charge.va_bank = payment
            .bank
            .or_else(|| params.payment_type.bank_code().map(str::to_string));
    }
    charge.expiry_time = payment.expired_date.as_deref().and_then(parse_time);
    charge.raw = into_object(raw);
    charge
}

pub fn to_payment_status(response: DokuResponse, raw: Value, order_id: &str) -> PaymentStatus {
    let transaction = response.transaction.unwrap_or_default();
    let amount = response
        .order
        .as_ref()
        .and_then(|o| o.amount.as_ref())
        .and_then(amount_value)
        .unwrap_or(0);
    let status = map_status(&transaction.status);
    let order_id = response
        .order
        .map(|o| o.invoice_number)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| order_id.to_string());

    let mut payment = PaymentStatus::new(transaction.id, order_id, status, amount)
        .with_paid_at(transaction.date.as_deref().and_then(parse_time));
    if status.is_success() {
        payment.paid_amount = amount;
    }
    payment.payment_type = response
        .channel
        .as_ref()
        .and_then(|c| payment_type_from_channel(&c.id));
    if status == Status::Failed {
        payment.failure_reason = response.response_message;
    }
    payment.raw = into_object(raw);
    payment
}

/// Maps a verified notification body
pub fn to_webhook_event(body: &[u8]) -> PaymentResult<WebhookEvent> {
    let raw: Value = serde_json::from_slice(body)
        .map_err(|e| PaymentError::InvalidPayload(format!("failed to parse notification: {}", e)))?;
    let notification: DokuResponse = serde_json::from_value(raw.clone())
        .map_err(|e| PaymentError::InvalidPayload(format!("unexpected notification shape: {}", e)))?;

    let order = notification
        .order
        .ok_or_else(|| PaymentError::InvalidPayload("notification has no order".to_string()))?;
    if order.invoice_number.is_empty() {
        return Err(PaymentError::InvalidPayload(
            "notification has no invoice_number".to_string(),
        ));
    }
    let transaction = notification
        .transaction
        .filter(|t| !t.status.is_empty())
        .ok_or_else(|| PaymentError::InvalidPayload("notification has no transaction status".to_string()))?;

    let amount = order.amount.as_ref().and_then(amount_value).unwrap_or(0);
    let mut event = WebhookEvent::new(
        order.invoice_number,
        transaction.id,
        map_status(&transaction.status),
        amount,
    );
    event.payment_type = notification
        .channel
        .as_ref()
        .and_then(|c| payment_type_from_channel(&c.id));
    if let Some(at) = transaction.date.as_deref().and_then(parse_time) {
        event.timestamp = at;
    }
    event.raw = into_object(raw);
    Ok(event)
}

/// Provider error from a non-2xx HTTP reply
pub fn decode_error(status: u16, body: &[u8]) -> PaymentError {
    let raw: Option<Value> = serde_json::from_slice(body).ok();
    let parsed: ErrorBody = raw
        .clone()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    let (code, message) = match parsed.error {
        Some(detail) if !detail.code.is_empty() => (detail.code, detail.message),
        _ => (
            parsed.response_code.unwrap_or_else(|| status.to_string()),
            parsed
                .response_message
                .or_else(|| parsed.message.map(flatten_message))
                .unwrap_or_else(|| format!("HTTP {}", status)),
        ),
    };

    let mut err = ProviderError::new(PROVIDER_NAME, code, message);
    if err.kind.is_none() {
        err.kind = ErrorKind::from_status(status);
    }
    if let Some(raw) = raw {
        err = err.with_raw(raw);
    }
    err.into()
}

fn flatten_message(message: Value) -> String {
    match message {
        Value::String(s) => s,
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn into_object(raw: Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
