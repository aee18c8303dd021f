//! # Midtrans Mapper
//!
//! Pure translation between the unified model and the Core API / Snap
//! wire shapes. Nothing in here performs I/O.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use pay_core::validation::normalize_phone;
use pay_core::{
    ChargeParams, ChargeResponse, Customer, ErrorKind, Item, PaymentError, PaymentResult,
    PaymentStatus, PaymentType, ProviderError, Status,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::PROVIDER_NAME;

/// Midtrans renders and reports times in Western Indonesia Time
static WIB: LazyLock<FixedOffset> =
    LazyLock::new(|| FixedOffset::east_opt(7 * 3600).expect("valid WIB offset"));

const NAME_SPLIT: usize = 20;
const WIRE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Core API request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    pub payment_type: &'static str,
    pub transaction_details: TransactionDetails,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_details: Vec<ItemDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gopay: Option<GopayOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopeepay: Option<ShopeePayOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qris: Option<QrisOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_transfer: Option<BankTransfer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echannel: Option<Echannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cstore: Option<Cstore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_expiry: Option<CustomExpiry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GopayOptions {
    pub enable_callback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopeePayOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QrisOptions {
    pub acquirer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BankTransfer {
    pub bank: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Echannel {
    pub bill_info1: String,
    pub bill_info2: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cstore {
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomExpiry {
    pub order_time: String,
    pub expiry_duration: i64,
    pub unit: &'static str,
}

// =============================================================================
// Snap request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SnapRequest {
    pub transaction_details: TransactionDetails,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_details: Vec<ItemDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,
    pub enabled_payments: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<SnapCallbacks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<SnapExpiry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapCallbacks {
    pub finish: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapExpiry {
    pub start_time: String,
    pub unit: &'static str,
    pub duration: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapResponse {
    pub token: String,
    pub redirect_url: String,
}

// =============================================================================
// Core API response / notification
// =============================================================================

/// Shared shape of charge, status and notification payloads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gross_amount: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_status: String,
    #[serde(default)]
    pub transaction_time: Option<String>,
    #[serde(default)]
    pub settlement_time: Option<String>,
    #[serde(default)]
    pub expiry_time: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub va_numbers: Vec<VaNumber>,
    #[serde(default)]
    pub permata_va_number: Option<String>,
    #[serde(default)]
    pub biller_code: Option<String>,
    #[serde(default)]
    pub bill_key: Option<String>,
    #[serde(default)]
    pub qr_string: Option<String>,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub payment_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaNumber {
    pub bank: String,
    pub va_number: String,
}

/// Body of a 4xx/5xx reply
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, deserialize_with = "lenient_string")]
    status_code: String,
    #[serde(default)]
    status_message: Option<String>,
    #[serde(default)]
    error_messages: Vec<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// =============================================================================
// Unified → wire
// =============================================================================

/// Core API `payment_type` for a unified type
pub fn wire_payment_type(payment_type: PaymentType) -> &'static str {
    match payment_type {
        PaymentType::GoPay
        | PaymentType::Ovo
        | PaymentType::Dana
        | PaymentType::ShopeePay
        | PaymentType::LinkAja
        | PaymentType::Qris => payment_type.as_str(),
        PaymentType::VaBca
        | PaymentType::VaBni
        | PaymentType::VaBri
        | PaymentType::VaPermata
        | PaymentType::VaCimb => "bank_transfer",
        PaymentType::VaMandiri => "echannel",
        PaymentType::CreditCard => "credit_card",
        PaymentType::Alfamart | PaymentType::Indomaret => "cstore",
    }
}

/// Snap `enabled_payments` code for a unified type
pub fn snap_payment_code(payment_type: PaymentType) -> &'static str {
    match payment_type {
        PaymentType::VaMandiri => "echannel",
        PaymentType::VaCimb => "other_va",
        PaymentType::Qris => "other_qris",
        other => other.as_str(),
    }
}

pub fn to_charge_request(params: &ChargeParams, now: DateTime<Utc>) -> PaymentResult<ChargeRequest> {
    let mut request = ChargeRequest {
        payment_type: wire_payment_type(params.payment_type),
        transaction_details: transaction_details(params),
        item_details: params.items.iter().map(item_detail).collect(),
        customer_details: Some(customer_details(&params.customer)),
        gopay: None,
        shopeepay: None,
        qris: None,
        bank_transfer: None,
        echannel: None,
        cstore: None,
        custom_expiry: params.expiry_time.map(|expiry| CustomExpiry {
            order_time: format_wib(now),
            expiry_duration: minutes_until(now, expiry),
            unit: "minute",
        }),
    };

    match params.payment_type {
        PaymentType::GoPay => {
            request.gopay = Some(GopayOptions {
                enable_callback: params.callback_url.is_some(),
                callback_url: params.callback_url.clone(),
            });
        }
        PaymentType::ShopeePay => {
            request.shopeepay = Some(ShopeePayOptions {
                callback_url: params.callback_url.clone(),
            });
        }
        PaymentType::Qris => {
            request.qris = params.custom_str("acquirer").map(|acquirer| QrisOptions {
                acquirer: acquirer.to_string(),
            });
        }
        PaymentType::Ovo | PaymentType::Dana | PaymentType::LinkAja => {}
        bank @ (PaymentType::VaBca
        | PaymentType::VaBni
        | PaymentType::VaBri
        | PaymentType::VaPermata
        | PaymentType::VaCimb) => {
            request.bank_transfer = Some(BankTransfer {
                bank: bank.bank_code().unwrap_or_default().to_string(),
            });
        }
        PaymentType::VaMandiri => {
            request.echannel = Some(Echannel {
                bill_info1: params
                    .description
                    .clone()
                    .unwrap_or_else(|| "Payment".to_string()),
                bill_info2: params.order_id.clone(),
            });
        }
        store @ (PaymentType::Alfamart | PaymentType::Indomaret) => {
            request.cstore = Some(Cstore {
                store: store.as_str().to_string(),
                message: params.description.clone(),
            });
        }
        PaymentType::CreditCard => {
            return Err(PaymentError::Unimplemented(
                "credit card charges require card tokenization".to_string(),
            ));
        }
    }

    Ok(request)
}

pub fn to_snap_request(params: &ChargeParams, now: DateTime<Utc>) -> SnapRequest {
    SnapRequest {
        transaction_details: transaction_details(params),
        item_details: params.items.iter().map(item_detail).collect(),
        customer_details: Some(customer_details(&params.customer)),
        enabled_payments: vec![snap_payment_code(params.payment_type)],
        callbacks: params.return_url.clone().map(|finish| SnapCallbacks { finish }),
        expiry: params.expiry_time.map(|expiry| SnapExpiry {
            start_time: format_wib(now),
            unit: "minute",
            duration: minutes_until(now, expiry),
        }),
    }
}

fn transaction_details(params: &ChargeParams) -> TransactionDetails {
    TransactionDetails {
        order_id: params.order_id.clone(),
        gross_amount: params.amount,
    }
}

fn item_detail(item: &Item) -> ItemDetail {
    ItemDetail {
        id: item.id.clone(),
        name: item.name.clone(),
        price: item.price,
        quantity: item.quantity,
        category: item.category.clone(),
        url: item.url.clone(),
    }
}

fn customer_details(customer: &Customer) -> CustomerDetails {
    let (first_name, last_name) = split_name(&customer.name);
    let phone = if customer.phone.is_empty() {
        String::new()
    } else {
        normalize_phone(&customer.phone).unwrap_or_else(|_| customer.phone.clone())
    };
    CustomerDetails {
        first_name,
        last_name,
        email: customer.email.clone(),
        phone,
    }
}

/// First 20 characters become the first name, the rest the last name
pub fn split_name(name: &str) -> (String, String) {
    let name = name.trim();
    match name.char_indices().nth(NAME_SPLIT) {
        Some((at, _)) => (name[..at].to_string(), name[at..].trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

fn minutes_until(now: DateTime<Utc>, expiry: DateTime<Utc>) -> i64 {
    let seconds = (expiry - now).num_seconds();
    ((seconds + 59) / 60).max(1)
}

pub fn format_wib(time: DateTime<Utc>) -> String {
    time.with_timezone(&*WIB)
        .format("%Y-%m-%d %H:%M:%S %z")
        .to_string()
}

/// Wire timestamps carry no offset; they are WIB
pub fn parse_wib(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), WIRE_TIME_FORMAT).ok()?;
    WIB.from_local_datetime(&naive)
        .single()
        .map(|t| t.with_timezone(&Utc))
}

// =============================================================================
// Wire → unified
// =============================================================================

pub fn map_status(transaction_status: &str) -> Status {
    match transaction_status {
        "capture" | "settlement" => Status::Success,
        "pending" => Status::Pending,
        "authorize" => Status::Processing,
        "deny" | "failure" => Status::Failed,
        "cancel" => Status::Cancelled,
        "expire" => Status::Expired,
        _ => Status::Pending,
    }
}

/// `"50000.00"` → `50000`
pub fn parse_amount(raw: &str) -> PaymentResult<i64> {
    let whole = raw.trim().split('.').next().unwrap_or_default();
    whole
        .parse()
        .map_err(|_| PaymentError::InvalidPayload(format!("gross_amount {:?} is not a number", raw)))
}

/// Unified payment type reported by a response or notification
pub fn payment_type_from_wire(response: &CoreResponse) -> Option<PaymentType> {
    match response.payment_type.as_str() {
        "bank_transfer" => {
            if response.permata_va_number.is_some() {
                return Some(PaymentType::VaPermata);
            }
            let bank = response.va_numbers.first()?.bank.to_ascii_lowercase();
            PaymentType::ALL
                .into_iter()
                .find(|p| p.is_va() && p.bank_code() == Some(bank.as_str()))
        }
        "echannel" => Some(PaymentType::VaMandiri),
        "cstore" => response.store.as_deref()?.parse().ok(),
        "credit_card" => Some(PaymentType::CreditCard),
        other => other.parse().ok(),
    }
}

/// Body-level `status_code` outside the accepted set is a gateway error.
///
/// 202 (denied) and 407 (expired) still describe a transaction.
pub fn check_envelope(response: &CoreResponse, raw: &Value) -> PaymentResult<()> {
    let accepted = match response.status_code.as_str() {
        "" | "200" | "201" => true,
        "202" | "407" => !response.transaction_status.is_empty(),
        _ => false,
    };
    if accepted {
        return Ok(());
    }
    Err(provider_error(
        response.status_code.clone(),
        response.status_message.clone(),
    )
    .with_raw(raw.clone())
    .into())
}

/// Midtrans reports a reused `order_id` as status code 406.
fn provider_error(code: String, message: String) -> ProviderError {
    let duplicate = code == "406";
    let err = ProviderError::new(PROVIDER_NAME, code, message);
    if duplicate {
        err.with_kind(ErrorKind::DuplicateTransaction)
    } else {
        err
    }
}

pub fn to_charge_response(
    response: CoreResponse,
    raw: Value,
    params: &ChargeParams,
) -> PaymentResult<ChargeResponse> {
    let amount = if response.gross_amount.is_empty() {
        params.amount
    } else {
        parse_amount(&response.gross_amount)?
    };
    let order_id = if response.order_id.is_empty() {
        params.order_id.clone()
    } else {
        response.order_id.clone()
    };

    let mut charge = ChargeResponse::new(response.transaction_id.clone(), order_id, amount);
    charge.status = map_status(&response.transaction_status);
    charge.payment_url = response.actions.first().map(|a| a.url.clone());
    charge.qr_string = response.qr_string.clone();
    charge.expiry_time = response.expiry_time.as_deref().and_then(parse_wib);
    if let Some(created) = response.transaction_time.as_deref().and_then(parse_wib) {
        charge.created_at = created;
        charge.updated_at = created;
    }

    if let Some(va) = response.va_numbers.first() {
        charge.va_number = Some(va.va_number.clone());
        charge.va_bank = Some(va.bank.clone());
    } else if let Some(number) = &response.permata_va_number {
        charge.va_number = Some(number.clone());
        charge.va_bank = Some("permata".to_string());
    } else if let (Some(biller), Some(key)) = (&response.biller_code, &response.bill_key) {
        charge.va_number = Some(format!("{}-{}", biller, key));
        charge.va_bank = Some("mandiri".to_string());
    } else if let Some(code) = &response.payment_code {
        charge.va_number = Some(code.clone());
        charge.va_bank = response.store.clone();
    }

    charge.raw = into_object(raw);
    Ok(charge)
}

pub fn snap_to_charge_response(response: SnapResponse, raw: Value, params: &ChargeParams) -> ChargeResponse {
    let mut charge = ChargeResponse::new(response.token, params.order_id.clone(), params.amount);
    charge.payment_url = Some(response.redirect_url);
    charge.expiry_time = params.expiry_time;
    charge.raw = into_object(raw);
    charge
}

pub fn to_payment_status(response: CoreResponse, raw: Value) -> PaymentResult<PaymentStatus> {
    let amount = if response.gross_amount.is_empty() {
        0
    } else {
        parse_amount(&response.gross_amount)?
    };
    let status = map_status(&response.transaction_status);

    let mut payment = PaymentStatus::new(
        response.transaction_id.clone(),
        response.order_id.clone(),
        status,
        amount,
    )
    .with_paid_at(
        response
            .settlement_time
            .as_deref()
            .or(response.transaction_time.as_deref())
            .and_then(parse_wib),
    );
    payment.payment_type = payment_type_from_wire(&response);
    match status {
        Status::Success => payment.paid_amount = amount,
        Status::Failed => {
            payment.failure_reason = Some(response.status_message.clone()).filter(|m| !m.is_empty())
        }
        Status::Expired => payment.expired_at = response.expiry_time.as_deref().and_then(parse_wib),
        _ => {}
    }
    payment.raw = into_object(raw);
    Ok(payment)
}

/// Provider error from a non-2xx HTTP reply
pub fn decode_error(status: u16, body: &[u8]) -> PaymentError {
    let raw: Option<Value> = serde_json::from_slice(body).ok();
    let parsed: ErrorBody = raw
        .clone()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    let code = if parsed.status_code.is_empty() {
        status.to_string()
    } else {
        parsed.status_code
    };
    let message = parsed
        .status_message
        .filter(|m| !m.is_empty())
        .or_else(|| (!parsed.error_messages.is_empty()).then(|| parsed.error_messages.join("; ")))
        .unwrap_or_else(|| format!("HTTP {}", status));

    let mut err = provider_error(code, message);
    if err.kind.is_none() {
        err.kind = ErrorKind::from_status(status);
    }
    if let Some(raw) = raw {
        err = err.with_raw(raw);
    }
    err.into()
}

fn into_object(raw: Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pay_core::{Customer, ErrorKind};
    use serde_json::json;

    fn params(payment_type: PaymentType) -> ChargeParams {
        ChargeParams::new(
            "ORDER-1",
            50_000,
            payment_type,
            Customer::new("CUST-1", "Budi", "a@b.co", "08123456789"),
        )
        .with_item(Item::new("I1", "N", 50_000, 1))
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap()
    }

    #[test]
    fn test_gopay_request_shape() {
        let p = params(PaymentType::GoPay).with_callback_url("https://cb");
        let body = serde_json::to_value(to_charge_request(&p, fixed_now()).unwrap()).unwrap();

        assert_eq!(body["payment_type"], "gopay");
        assert_eq!(body["transaction_details"]["gross_amount"], 50_000);
        assert_eq!(body["gopay"]["enable_callback"], true);
        assert_eq!(body["gopay"]["callback_url"], "https://cb");
        assert_eq!(body["customer_details"]["phone"], "+628123456789");
        assert!(body.get("bank_transfer").is_none());
    }

    #[test]
    fn test_bank_transfer_and_echannel() {
        let body =
            serde_json::to_value(to_charge_request(&params(PaymentType::VaBni), fixed_now()).unwrap())
                .unwrap();
        assert_eq!(body["payment_type"], "bank_transfer");
        assert_eq!(body["bank_transfer"]["bank"], "bni");

        let body = serde_json::to_value(
            to_charge_request(&params(PaymentType::VaMandiri), fixed_now()).unwrap(),
        )
        .unwrap();
        assert_eq!(body["payment_type"], "echannel");
        assert_eq!(body["echannel"]["bill_info2"], "ORDER-1");
    }

    #[test]
    fn test_credit_card_unimplemented() {
        let err = to_charge_request(&params(PaymentType::CreditCard), fixed_now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unimplemented);
    }

    #[test]
    fn test_custom_expiry() {
        let p = params(PaymentType::Qris)
            .with_expiry_time(fixed_now() + Duration::seconds(90))
            .with_custom("acquirer", "gopay");
        let body = serde_json::to_value(to_charge_request(&p, fixed_now()).unwrap()).unwrap();
        assert_eq!(body["custom_expiry"]["order_time"], "2024-01-01 10:00:00 +0700");
        assert_eq!(body["custom_expiry"]["expiry_duration"], 2);
        assert_eq!(body["qris"]["acquirer"], "gopay");
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("Budi"), ("Budi".to_string(), String::new()));
        let (first, last) = split_name("Bambang Pamungkas Wijaya Kusuma");
        assert_eq!(first, "Bambang Pamungkas Wi");
        assert_eq!(last, "jaya Kusuma");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status("settlement"), Status::Success);
        assert_eq!(map_status("capture"), Status::Success);
        assert_eq!(map_status("authorize"), Status::Processing);
        assert_eq!(map_status("deny"), Status::Failed);
        assert_eq!(map_status("cancel"), Status::Cancelled);
        assert_eq!(map_status("expire"), Status::Expired);
        assert_eq!(map_status("refund"), Status::Pending);
    }

    #[test]
    fn test_charge_response_va_fallbacks() {
        let raw = json!({
            "status_code": "201",
            "transaction_id": "T2",
            "order_id": "ORDER-1",
            "gross_amount": "50000.00",
            "payment_type": "echannel",
            "transaction_status": "pending",
            "transaction_time": "2024-01-01 10:00:00",
            "biller_code": "70012",
            "bill_key": "990000000001"
        });
        let response: CoreResponse = serde_json::from_value(raw.clone()).unwrap();
        let charge = to_charge_response(response, raw, &params(PaymentType::VaMandiri)).unwrap();

        assert_eq!(charge.amount, 50_000);
        assert_eq!(charge.va_number.as_deref(), Some("70012-990000000001"));
        assert_eq!(charge.va_bank.as_deref(), Some("mandiri"));
        assert_eq!(charge.created_at, fixed_now());
    }

    #[test]
    fn test_envelope_error() {
        let raw = json!({"status_code": "406", "status_message": "duplicate order id"});
        let response: CoreResponse = serde_json::from_value(raw.clone()).unwrap();
        let err = check_envelope(&response, &raw).unwrap_err();
        assert!(err.is_provider_error());
        assert_eq!(err.as_provider_error().unwrap().code, "406");
        assert!(err.is(ErrorKind::DuplicateTransaction));

        let expired = json!({"status_code": "407", "transaction_status": "expire"});
        let response: CoreResponse = serde_json::from_value(expired.clone()).unwrap();
        assert!(check_envelope(&response, &expired).is_ok());
    }

    #[test]
    fn test_decode_error_classifies() {
        let err = decode_error(401, br#"{"status_code":"401","status_message":"Access denied"}"#);
        assert!(err.is(ErrorKind::InvalidCredentials));
        assert_eq!(err.to_string(), "midtrans error [401]: Access denied");

        let err = decode_error(400, br#"{"error_messages":["transaction_details.gross_amount is required"]}"#);
        assert!(err.to_string().contains("gross_amount is required"));

        let err = decode_error(503, b"upstream down");
        assert!(err.is(ErrorKind::ServiceUnavailable));

        let err = decode_error(406, br#"{"status_message":"order_id has already been taken"}"#);
        assert!(err.is(ErrorKind::DuplicateTransaction));
        assert_eq!(err.as_provider_error().unwrap().code, "406");
    }

    #[test]
    fn test_payment_status_success() {
        let raw = json!({
            "status_code": "200",
            "transaction_id": "T1",
            "order_id": "ORDER-1",
            "gross_amount": "50000.00",
            "payment_type": "bank_transfer",
            "transaction_status": "settlement",
            "settlement_time": "2024-01-01 10:00:00",
            "va_numbers": [{"bank": "bca", "va_number": "123"}]
        });
        let response: CoreResponse = serde_json::from_value(raw.clone()).unwrap();
        let status = to_payment_status(response, raw).unwrap();
        assert_eq!(status.status, Status::Success);
        assert_eq!(status.paid_amount, 50_000);
        assert_eq!(status.payment_type, Some(PaymentType::VaBca));
        assert_eq!(status.paid_at, Some(fixed_now()));
    }
}
