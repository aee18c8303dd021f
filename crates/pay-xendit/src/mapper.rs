//! # Xendit Mapper
//!
//! Routing by method class:
//!
//! | Class            | Endpoint                         |
//! |------------------|----------------------------------|
//! | e-wallet, QRIS   | `POST /ewallets`                 |
//! | virtual account  | `POST /callback_virtual_accounts`|
//! | retail, card     | `POST /v2/invoices`              |

use chrono::{DateTime, SecondsFormat, Utc};
use pay_core::validation::normalize_phone;
use pay_core::{
    ChargeParams, ChargeResponse, ErrorKind, FieldError, Item, PaymentError, PaymentResult,
    PaymentStatus, PaymentType, ProviderError, Status,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::PROVIDER_NAME;

pub const CURRENCY: &str = "IDR";
pub const ONE_TIME_PAYMENT: &str = "ONE_TIME_PAYMENT";
pub const TOKENIZED_PAYMENT: &str = "TOKENIZED_PAYMENT";
pub const REDEEM_NONE: &str = "REDEEM_NONE";

/// Which Xendit product a charge goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ewallet,
    CallbackVirtualAccount,
    Invoice,
}

pub fn route(payment_type: PaymentType) -> Route {
    if payment_type.is_ewallet() || payment_type.is_qris() {
        Route::Ewallet
    } else if payment_type.is_va() {
        Route::CallbackVirtualAccount
    } else {
        Route::Invoice
    }
}

pub const EWALLET_CHARGE_PREFIX: &str = "ewc_";

/// Best guess of the product behind a transaction id.
///
/// E-wallet charge ids carry an `ewc_` prefix. Invoice and callback VA ids
/// share one shape, so anything else is tried as an invoice first.
pub fn route_for_id(transaction_id: &str) -> Route {
    if transaction_id.starts_with(EWALLET_CHARGE_PREFIX) {
        Route::Ewallet
    } else {
        Route::Invoice
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EwalletChargeRequest {
    pub reference_id: String,
    pub currency: &'static str,
    pub amount: i64,
    pub checkout_method: String,
    pub channel_code: &'static str,
    pub channel_properties: ChannelProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChannelProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeem_points: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackVaRequest {
    pub external_id: String,
    pub bank_code: String,
    pub name: String,
    pub expected_amount: i64,
    pub is_closed: bool,
    pub currency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRequest {
    pub external_id: String,
    pub amount: i64,
    pub currency: &'static str,
    pub payer_email: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_redirect_url: Option<String>,
    pub payment_methods: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<InvoiceItem>,
    pub customer: InvoiceCustomer,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceItem {
    pub name: String,
    pub quantity: u32,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceCustomer {
    pub given_names: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpireInvoiceRequest {
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpireVaRequest {
    pub expiration_date: String,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct EwalletChargeResponse {
    pub id: String,
    #[serde(default)]
    pub reference_id: String,
    pub status: String,
    #[serde(default)]
    pub charge_amount: Option<Value>,
    #[serde(default)]
    pub channel_code: Option<String>,
    #[serde(default)]
    pub actions: Option<EwalletActions>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EwalletActions {
    #[serde(default)]
    pub desktop_web_checkout_url: Option<String>,
    #[serde(default)]
    pub mobile_web_checkout_url: Option<String>,
    #[serde(default)]
    pub mobile_deeplink_checkout_url: Option<String>,
    #[serde(default)]
    pub qr_checkout_string: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackVaResponse {
    pub id: String,
    #[serde(default)]
    pub external_id: String,
    pub account_number: String,
    pub status: String,
    #[serde(default)]
    pub expected_amount: Option<Value>,
    #[serde(default)]
    pub bank_code: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceResponse {
    pub id: String,
    #[serde(default)]
    pub external_id: String,
    pub status: String,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub paid_amount: Option<Value>,
    #[serde(default)]
    pub invoice_url: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_channel: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

// =============================================================================
// Unified → wire
// =============================================================================

pub fn channel_code(payment_type: PaymentType) -> Option<&'static str> {
    match payment_type {
        PaymentType::GoPay => Some("GOPAY"),
        PaymentType::Ovo => Some("OVO"),
        PaymentType::Dana => Some("DANA"),
        PaymentType::LinkAja => Some("LINKAJA"),
        PaymentType::ShopeePay => Some("SHOPEEPAY"),
        PaymentType::Qris => Some("QRIS"),
        _ => None,
    }
}

pub fn to_ewallet_request(params: &ChargeParams) -> PaymentResult<EwalletChargeRequest> {
    let channel = channel_code(params.payment_type).ok_or_else(|| {
        PaymentError::InvalidParameter(format!("{} is not an e-wallet", params.payment_type))
    })?;

    let checkout_method = params
        .custom_str("checkout_method")
        .unwrap_or(ONE_TIME_PAYMENT)
        .to_ascii_uppercase();
    let tokenized = match checkout_method.as_str() {
        ONE_TIME_PAYMENT => false,
        TOKENIZED_PAYMENT => true,
        other => {
            return Err(FieldError::new(
                "checkout_method",
                format!("unknown checkout method {}", other),
                ErrorKind::InvalidParameter,
            )
            .into())
        }
    };

    let payment_method_id = params.custom_str("payment_method_id").map(str::to_string);
    let customer_id = params.custom_str("customer_id").map(str::to_string);
    if tokenized {
        if payment_method_id.is_none() {
            return Err(missing("payment_method_id", "is required for tokenized payments"));
        }
        if customer_id.is_none() {
            return Err(missing("customer_id", "is required for tokenized payments"));
        }
    }

    let mut properties = ChannelProperties {
        success_redirect_url: params.return_url.clone(),
        failure_redirect_url: params.custom_str("failure_redirect_url").map(str::to_string),
        redeem_points: params.custom_str("redeem_points").map(str::to_string),
        ..ChannelProperties::default()
    };

    match params.payment_type {
        PaymentType::Dana | PaymentType::LinkAja | PaymentType::ShopeePay
            if properties.success_redirect_url.is_none() =>
        {
            return Err(missing("ReturnURL", "success redirect is required for this channel"));
        }
        PaymentType::Ovo if !tokenized => {
            let phone = normalize_phone(&params.customer.phone)?;
            properties.mobile_number = Some(phone);
        }
        PaymentType::Ovo => {
            if properties.success_redirect_url.is_none() {
                return Err(missing("ReturnURL", "is required for tokenized OVO"));
            }
            if properties.failure_redirect_url.is_none() {
                return Err(missing("failure_redirect_url", "is required for tokenized OVO"));
            }
        }
        _ => {}
    }

    let redeems = params.payment_type == PaymentType::ShopeePay
        || (params.payment_type == PaymentType::Ovo && tokenized);
    if redeems && properties.redeem_points.is_none() {
        properties.redeem_points = Some(REDEEM_NONE.to_string());
    }

    Ok(EwalletChargeRequest {
        reference_id: params.order_id.clone(),
        currency: CURRENCY,
        amount: params.amount,
        checkout_method,
        channel_code: channel,
        channel_properties: properties,
        payment_method_id,
        customer_id,
    })
}

/// Fixed-amount VA: closed at the charge amount, so partial or over
/// payments are rejected by the bank.
pub fn to_callback_va_request(params: &ChargeParams) -> PaymentResult<CallbackVaRequest> {
    let bank = params.payment_type.bank_code().ok_or_else(|| {
        PaymentError::InvalidParameter(format!("{} is not a virtual account", params.payment_type))
    })?;
    let name = if params.customer.name.trim().is_empty() {
        params.customer.id.clone()
    } else {
        params.customer.name.clone()
    };

    Ok(CallbackVaRequest {
        external_id: params.order_id.clone(),
        bank_code: bank.to_ascii_uppercase(),
        name,
        expected_amount: params.amount,
        is_closed: true,
        currency: CURRENCY,
        expiration_date: params.expiry_time.map(format_time),
    })
}

pub fn invoice_methods(payment_type: PaymentType) -> Vec<&'static str> {
    match payment_type {
        PaymentType::Alfamart => vec!["ALFAMART"],
        PaymentType::Indomaret => vec!["INDOMARET"],
        PaymentType::CreditCard => vec!["CREDIT_CARD"],
        _ => Vec::new(),
    }
}

pub fn to_invoice_request(params: &ChargeParams, now: DateTime<Utc>) -> InvoiceRequest {
    InvoiceRequest {
        external_id: params.order_id.clone(),
        amount: params.amount,
        currency: CURRENCY,
        payer_email: params.customer.email.clone(),
        description: params
            .description
            .clone()
            .unwrap_or_else(|| format!("Payment for {}", params.order_id)),
        invoice_duration: params
            .expiry_time
            .map(|expiry| (expiry - now).num_seconds().max(1)),
        success_redirect_url: params.return_url.clone(),
        failure_redirect_url: params.custom_str("failure_redirect_url").map(str::to_string),
        payment_methods: invoice_methods(params.payment_type),
        items: params.items.iter().map(invoice_item).collect(),
        customer: InvoiceCustomer {
            given_names: params.customer.name.clone(),
            email: params.customer.email.clone(),
            mobile_number: normalize_phone(&params.customer.phone).ok(),
        },
    }
}

fn invoice_item(item: &Item) -> InvoiceItem {
    InvoiceItem {
        name: item.name.clone(),
        quantity: item.quantity,
        price: item.price,
        category: item.category.clone(),
        url: item.url.clone(),
    }
}

/// Expiry backdated an hour, which closes the invoice
pub fn expire_invoice_request(now: DateTime<Utc>) -> ExpireInvoiceRequest {
    ExpireInvoiceRequest {
        expires_at: format_time(now - chrono::Duration::hours(1)),
    }
}

/// Expiration backdated an hour, which deactivates the VA
pub fn expire_va_request(now: DateTime<Utc>) -> ExpireVaRequest {
    ExpireVaRequest {
        expiration_date: format_time(now - chrono::Duration::hours(1)),
    }
}

fn missing(field: &str, message: &str) -> PaymentError {
    FieldError::new(field, message, ErrorKind::MissingParameter).into()
}

pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

// =============================================================================
// Wire → unified
// =============================================================================

pub fn map_status(status: &str) -> Status {
    match status.to_ascii_uppercase().as_str() {
        "PAID" | "SUCCEEDED" | "SETTLED" | "COMPLETED" => Status::Success,
        "PENDING" | "ACTIVE" => Status::Pending,
        "FAILED" => Status::Failed,
        "EXPIRED" => Status::Expired,
        "VOIDED" => Status::Cancelled,
        _ => Status::Pending,
    }
}

/// Xendit amounts arrive as integers, floats or numeric strings
pub fn amount_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().split('.').next()?.parse().ok(),
        _ => None,
    }
}

/// `ID_OVO`, `OVO` → [`PaymentType::Ovo`]; bank codes → VA types
pub fn payment_type_from_code(code: &str) -> Option<PaymentType> {
    let code = code.trim().to_ascii_lowercase();
    let code = code.strip_prefix("id_").unwrap_or(&code);
    PaymentType::ALL
        .into_iter()
        .find(|p| (p.is_va() && p.bank_code() == Some(code)) || p.as_str() == code)
}

pub fn ewallet_to_charge_response(
    response: EwalletChargeResponse,
    raw: Value,
    params: &ChargeParams,
) -> ChargeResponse {
    let amount = response
        .charge_amount
        .as_ref()
        .and_then(amount_value)
        .unwrap_or(params.amount);
    let mut charge = ChargeResponse::new(response.id, params.order_id.clone(), amount);
    charge.status = map_status(&response.status);

    let actions = response.actions.unwrap_or_default();
    charge.payment_url = actions
        .desktop_web_checkout_url
        .or(actions.mobile_web_checkout_url)
        .or(actions.mobile_deeplink_checkout_url);
    charge.qr_string = actions.qr_checkout_string;

    if let Some(created) = response.created.as_deref().and_then(parse_time) {
        charge.created_at = created;
    }
    if let Some(updated) = response.updated.as_deref().and_then(parse_time) {
        charge.updated_at = updated;
    }
    charge.raw = into_object(raw);
    charge
}

pub fn callback_va_to_charge_response(
    response: CallbackVaResponse,
    raw: Value,
    request: &CallbackVaRequest,
) -> ChargeResponse {
    let mut charge = ChargeResponse::new(
        response.id,
        request.external_id.clone(),
        request.expected_amount,
    );
    charge.status = map_status(&response.status);
    charge.va_number = Some(response.account_number);
    charge.va_bank = Some(response.bank_code.unwrap_or_else(|| request.bank_code.clone()));
    charge.expiry_time = response.expiration_date.as_deref().and_then(parse_time);
    charge.raw = into_object(raw);
    charge
}

pub fn invoice_to_charge_response(
    response: InvoiceResponse,
    raw: Value,
    params: &ChargeParams,
) -> ChargeResponse {
    let amount = response
        .amount
        .as_ref()
        .and_then(amount_value)
        .unwrap_or(params.amount);
    let mut charge = ChargeResponse::new(response.id, params.order_id.clone(), amount);
    charge.status = map_status(&response.status);
    charge.payment_url = response.invoice_url;
    charge.expiry_time = response.expiry_date.as_deref().and_then(parse_time);
    if let Some(created) = response.created.as_deref().and_then(parse_time) {
        charge.created_at = created;
    }
    charge.raw = into_object(raw);
    charge
}

pub fn invoice_to_payment_status(response: InvoiceResponse, raw: Value) -> PaymentStatus {
    let amount = response.amount.as_ref().and_then(amount_value).unwrap_or(0);
    let status = map_status(&response.status);

    let mut payment = PaymentStatus::new(response.id, response.external_id, status, amount)
        .with_paid_at(response.paid_at.as_deref().and_then(parse_time));
    payment.paid_amount = response
        .paid_amount
        .as_ref()
        .and_then(amount_value)
        .unwrap_or(if status.is_success() { amount } else { 0 });
    payment.payment_type = response
        .payment_channel
        .as_deref()
        .or(response.payment_method.as_deref())
        .and_then(payment_type_from_code);
    if status == Status::Expired {
        payment.expired_at = response.expiry_date.as_deref().and_then(parse_time);
    }
    payment.raw = into_object(raw);
    payment
}

pub fn ewallet_to_payment_status(response: EwalletChargeResponse, raw: Value) -> PaymentStatus {
    let amount = response.charge_amount.as_ref().and_then(amount_value).unwrap_or(0);
    let status = map_status(&response.status);
    let updated = response.updated.as_deref().and_then(parse_time);

    let mut payment = PaymentStatus::new(response.id, response.reference_id, status, amount);
    payment.payment_type = response.channel_code.as_deref().and_then(payment_type_from_code);
    match status {
        Status::Success => {
            payment.paid_amount = amount;
            payment.paid_at = updated;
        }
        Status::Cancelled => payment.cancelled_at = updated,
        _ => {}
    }
    payment.raw = into_object(raw);
    payment
}

/// The VA resource only knows whether it still accepts payment. An
/// inactive VA past its expiration date is reported as expired.
pub fn callback_va_to_payment_status(
    response: CallbackVaResponse,
    raw: Value,
    now: DateTime<Utc>,
) -> PaymentStatus {
    let amount = response.expected_amount.as_ref().and_then(amount_value).unwrap_or(0);
    let expiration = response.expiration_date.as_deref().and_then(parse_time);
    let status = match response.status.to_ascii_uppercase().as_str() {
        "INACTIVE" if expiration.is_some_and(|at| at <= now) => Status::Expired,
        other => map_status(other),
    };

    let mut payment = PaymentStatus::new(response.id, response.external_id, status, amount);
    payment.payment_type = response.bank_code.as_deref().and_then(payment_type_from_code);
    if status == Status::Expired {
        payment.expired_at = expiration;
    }
    payment.raw = into_object(raw);
    payment
}

/// Provider error from a non-2xx HTTP reply
pub fn decode_error(status: u16, body: &[u8]) -> PaymentError {
    let raw: Option<Value> = serde_json::from_slice(body).ok();
    let parsed: ErrorBody = raw
        .clone()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    let code = if parsed.error_code.is_empty() {
        status.to_string()
    } else {
        parsed.error_code
    };
    let message = if parsed.message.is_empty() {
        format!("HTTP {}", status)
    } else {
        parsed.message
    };

    let kind = classify(&code).or_else(|| ErrorKind::from_status(status));
    let mut err = ProviderError::new(PROVIDER_NAME, code, message);
    err.kind = kind;
    if let Some(raw) = raw {
        err = err.with_raw(raw);
    }
    err.into()
}

fn classify(error_code: &str) -> Option<ErrorKind> {
    match error_code {
        "INVALID_API_KEY" | "REQUEST_FORBIDDEN_ERROR" | "INVALID_MERCHANT_CREDENTIALS" => {
            Some(ErrorKind::InvalidCredentials)
        }
        "RATE_LIMIT_EXCEEDED" => Some(ErrorKind::RateLimit),
        "SERVER_ERROR" | "CHANNEL_UNAVAILABLE" => Some(ErrorKind::ServiceUnavailable),
        code if code.starts_with("DUPLICATE_") => Some(ErrorKind::DuplicateTransaction),
        code if code.ends_with("NOT_FOUND_ERROR") || code == "DATA_NOT_FOUND" => {
            Some(ErrorKind::TransactionNotFound)
        }
        _ => None,
    }
}

pub(crate) fn into_object(raw: Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pay_core::Customer;
    use serde_json::json;

    fn params(payment_type: PaymentType) -> ChargeParams {
        ChargeParams::new(
            "ORDER-1",
            150_000,
            payment_type,
            Customer::new("CUST-1", "Jane", "jane@example.com", "0812-3456-7890"),
        )
    }

    #[test]
    fn test_routing() {
        assert_eq!(route(PaymentType::Ovo), Route::Ewallet);
        assert_eq!(route(PaymentType::Qris), Route::Ewallet);
        assert_eq!(route(PaymentType::VaPermata), Route::CallbackVirtualAccount);
        assert_eq!(route(PaymentType::Alfamart), Route::Invoice);
        assert_eq!(route(PaymentType::CreditCard), Route::Invoice);
    }

    #[test]
    fn test_ovo_one_time_needs_mobile_number() {
        let request = to_ewallet_request(&params(PaymentType::Ovo)).unwrap();
        assert_eq!(request.channel_code, "OVO");
        assert_eq!(request.checkout_method, ONE_TIME_PAYMENT);
        assert_eq!(
            request.channel_properties.mobile_number.as_deref(),
            Some("+6281234567890")
        );

        let mut p = params(PaymentType::Ovo);
        p.customer.phone = "12345".to_string();
        let err = to_ewallet_request(&p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPhoneNumber);
    }

    #[test]
    fn test_redirect_required_channels() {
        let err = to_ewallet_request(&params(PaymentType::Dana)).unwrap_err();
        assert_eq!(err.as_field_error().unwrap().field, "ReturnURL");

        let request =
            to_ewallet_request(&params(PaymentType::ShopeePay).with_return_url("https://ok")).unwrap();
        assert_eq!(request.channel_properties.redeem_points.as_deref(), Some(REDEEM_NONE));
    }

    #[test]
    fn test_tokenized_rules() {
        let p = params(PaymentType::Ovo).with_custom("checkout_method", TOKENIZED_PAYMENT);
        let err = to_ewallet_request(&p).unwrap_err();
        assert_eq!(err.as_field_error().unwrap().field, "payment_method_id");

        let p = p
            .with_custom("payment_method_id", "pm-1")
            .with_custom("customer_id", "cust-1")
            .with_return_url("https://ok");
        let err = to_ewallet_request(&p).unwrap_err();
        assert_eq!(err.as_field_error().unwrap().field, "failure_redirect_url");

        let p = p.with_custom("failure_redirect_url", "https://fail");
        let request = to_ewallet_request(&p).unwrap();
        assert_eq!(request.channel_properties.redeem_points.as_deref(), Some(REDEEM_NONE));
        assert!(request.channel_properties.mobile_number.is_none());
    }

    #[test]
    fn test_unknown_checkout_method() {
        let p = params(PaymentType::GoPay).with_custom("checkout_method", "SUBSCRIPTION");
        assert!(to_ewallet_request(&p).unwrap_err().is(ErrorKind::InvalidParameter));
    }

    #[test]
    fn test_callback_va_body() {
        let body = serde_json::to_value(to_callback_va_request(&params(PaymentType::VaBca)).unwrap())
            .unwrap();
        assert_eq!(
            body,
            json!({
                "external_id": "ORDER-1",
                "bank_code": "BCA",
                "name": "Jane",
                "expected_amount": 150000,
                "is_closed": true,
                "currency": "IDR"
            })
        );
    }

    #[test]
    fn test_invoice_body() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let p = params(PaymentType::Indomaret).with_expiry_time(now + chrono::Duration::hours(2));
        let body = serde_json::to_value(to_invoice_request(&p, now)).unwrap();
        assert_eq!(body["payment_methods"], json!(["INDOMARET"]));
        assert_eq!(body["invoice_duration"], 7200);
        assert_eq!(body["customer"]["mobile_number"], "+6281234567890");
    }

    #[test]
    fn test_expire_request_is_in_the_past() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(expire_invoice_request(now).expires_at, "2024-01-01T11:00:00.000Z");
    }

    #[test]
    fn test_route_for_id() {
        assert_eq!(route_for_id("ewc_bb8c3po-c3po-r2d2"), Route::Ewallet);
        assert_eq!(route_for_id("579c8d61f23fa4ca35e52da4"), Route::Invoice);
    }

    #[test]
    fn test_callback_va_status() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let raw = json!({
            "id": "V1",
            "external_id": "ORDER-1",
            "account_number": "1234567890",
            "bank_code": "BNI",
            "status": "ACTIVE",
            "expected_amount": 150000,
            "expiration_date": "2024-01-03T00:00:00.000Z"
        });
        let response: CallbackVaResponse = serde_json::from_value(raw.clone()).unwrap();
        let status = callback_va_to_payment_status(response, raw, now);
        assert_eq!(status.transaction_id, "V1");
        assert_eq!(status.order_id, "ORDER-1");
        assert_eq!(status.status, Status::Pending);
        assert_eq!(status.amount, 150_000);
        assert_eq!(status.payment_type, Some(PaymentType::VaBni));

        let raw = json!({
            "id": "V1",
            "account_number": "1234567890",
            "status": "INACTIVE",
            "expiration_date": "2024-01-01T00:00:00.000Z"
        });
        let response: CallbackVaResponse = serde_json::from_value(raw.clone()).unwrap();
        let status = callback_va_to_payment_status(response, raw, now);
        assert_eq!(status.status, Status::Expired);
        assert!(status.expired_at.is_some());
    }

    #[test]
    fn test_ewallet_status() {
        let raw = json!({
            "id": "ewc_1",
            "reference_id": "ORDER-1",
            "status": "SUCCEEDED",
            "charge_amount": 150000,
            "channel_code": "ID_OVO",
            "updated": "2024-01-01T10:00:00.000Z"
        });
        let response: EwalletChargeResponse = serde_json::from_value(raw.clone()).unwrap();
        let status = ewallet_to_payment_status(response, raw);
        assert_eq!(status.status, Status::Success);
        assert_eq!(status.paid_amount, 150_000);
        assert_eq!(status.payment_type, Some(PaymentType::Ovo));
        assert_eq!(
            status.paid_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status("PAID"), Status::Success);
        assert_eq!(map_status("SUCCEEDED"), Status::Success);
        assert_eq!(map_status("PENDING"), Status::Pending);
        assert_eq!(map_status("FAILED"), Status::Failed);
        assert_eq!(map_status("EXPIRED"), Status::Expired);
        assert_eq!(map_status("VOIDED"), Status::Cancelled);
    }

    #[test]
    fn test_payment_type_from_code() {
        assert_eq!(payment_type_from_code("ID_OVO"), Some(PaymentType::Ovo));
        assert_eq!(payment_type_from_code("BNI"), Some(PaymentType::VaBni));
        assert_eq!(payment_type_from_code("INDOMARET"), Some(PaymentType::Indomaret));
        assert_eq!(payment_type_from_code("SAHABAT_SAMPURNA"), None);
    }

    #[test]
    fn test_decode_error() {
        let err = decode_error(
            400,
            br#"{"error_code":"DUPLICATE_CALLBACK_VIRTUAL_ACCOUNT_ERROR","message":"exists"}"#,
        );
        assert!(err.is(ErrorKind::DuplicateTransaction));
        assert_eq!(
            err.to_string(),
            "xendit error [DUPLICATE_CALLBACK_VIRTUAL_ACCOUNT_ERROR]: exists"
        );

        let err = decode_error(404, br#"{"error_code":"INVOICE_NOT_FOUND_ERROR","message":"gone"}"#);
        assert!(err.is(ErrorKind::TransactionNotFound));
    }

    #[test]
    fn test_amount_value() {
        assert_eq!(amount_value(&json!(150000)), Some(150_000));
        assert_eq!(amount_value(&json!(150000.0)), Some(150_000));
        assert_eq!(amount_value(&json!("150000.00")), Some(150_000));
        assert_eq!(amount_value(&json!(null)), None);
    }
}
