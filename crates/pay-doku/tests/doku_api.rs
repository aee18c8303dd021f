use pay_core::{
    ChargeParams, Context, Customer, Environment, ErrorKind, PaymentError, PaymentType, Provider,
    ProviderConfig, Status, WebhookRequest,
};
use pay_doku::{request_signature, DokuProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const CLIENT_ID: &str = "BRN-0001-1700000000000";
const SECRET_KEY: &str = "SK-doku-secret";

/// Recomputes the Signature header from the received request
struct SignedRequest;

impl Match for SignedRequest {
    fn matches(&self, request: &Request) -> bool {
        let get = |name: &str| request.headers.get(name).and_then(|v| v.to_str().ok());
        match (get("Request-Timestamp"), get("Signature")) {
            (Some(timestamp), Some(signature)) => {
                signature == request_signature(CLIENT_ID, SECRET_KEY, timestamp, &request.body)
            }
            _ => false,
        }
    }
}

fn provider(server: &MockServer) -> DokuProvider {
    let config = ProviderConfig::new(Environment::Sandbox, SECRET_KEY)
        .with_client_key(CLIENT_ID)
        .with_api_base_url(server.uri());
    DokuProvider::new(config).unwrap()
}

fn params(order_id: &str, amount: i64, payment_type: PaymentType) -> ChargeParams {
    ChargeParams::new(
        order_id,
        amount,
        payment_type,
        Customer::new("CUST-1", "Sari", "sari@example.com", "081234567890"),
    )
}

#[tokio::test]
async fn test_virtual_account_charge_is_signed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments/v2"))
        .and(header("Client-Id", CLIENT_ID))
        .and(header_exists("Request-Id"))
        .and(SignedRequest)
        .and(body_partial_json(json!({
            "order": {"invoice_number": "INV-VA-1", "amount": "75000", "currency": "IDR"},
            "payment": {"payment_type": "VIRTUAL_ACCOUNT", "va_type": "bca_va"},
            "customer": {"id": "CUST-1", "phone": "+6281234567890"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "order": {"invoice_number": "INV-VA-1", "amount": "75000"},
            "payment": {"va_number": "8808123456789", "expired_date": "20240102100000"},
            "transaction": {"id": "DK-1", "status": "PENDING"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let charge = provider(&server)
        .create_charge(&Context::background(), &params("INV-VA-1", 75_000, PaymentType::VaBca))
        .await
        .unwrap();

    assert_eq!(charge.transaction_id, "DK-1");
    assert_eq!(charge.amount, 75_000);
    assert_eq!(charge.status, Status::Pending);
    assert_eq!(charge.va_number.as_deref(), Some("8808123456789"));
    assert_eq!(charge.va_bank.as_deref(), Some("bca"));
    assert!(charge.expiry_time.is_some());
}

#[tokio::test]
async fn test_qris_charge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments/v2"))
        .and(SignedRequest)
        .and(body_partial_json(json!({
            "payment": {"payment_type": "QR_CODE", "qr_type": "DYNAMIC"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response_code": "0000",
            "payment": {"qr_string": "00020101021226"},
            "transaction": {"id": "DK-2", "status": "PENDING"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let charge = provider(&server)
        .create_charge(&Context::background(), &params("INV-Q-1", 10_000, PaymentType::Qris))
        .await
        .unwrap();
    assert_eq!(charge.qr_string.as_deref(), Some("00020101021226"));
    assert_eq!(charge.amount, 10_000);
}

#[tokio::test]
async fn test_invalid_input_fails_before_io() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let err = provider
        .create_charge(&Context::background(), &params("INV-1", 5_000, PaymentType::VaBca))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::MinAmount));

    let err = provider
        .create_charge(&Context::background(), &params("INV-1", 50_000, PaymentType::Alfamart))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::InvalidParameter));
}

#[tokio::test]
async fn test_rejected_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response_code": "5001",
            "response_message": "Invalid invoice number"
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .create_charge(&Context::background(), &params("INV-1", 50_000, PaymentType::Ovo))
        .await
        .unwrap_err();
    let provider_error = err.as_provider_error().unwrap();
    assert_eq!(provider_error.code, "5001");
    assert_eq!(provider_error.message, "Invalid invoice number");
}

#[tokio::test]
async fn test_bad_signature_is_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": ["Invalid Header Signature"]
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .create_charge(&Context::background(), &params("INV-1", 50_000, PaymentType::VaBni))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::InvalidCredentials));
}

#[tokio::test]
async fn test_get_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transactions/v2"))
        .and(SignedRequest)
        .and(body_partial_json(json!({"transaction_id": "DK-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "order": {"invoice_number": "INV-VA-1", "amount": 75000},
            "transaction": {"id": "DK-1", "status": "SUCCESS", "date": "2024-01-01T10:00:00Z"},
            "channel": {"id": "VIRTUAL_ACCOUNT_BCA"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = provider(&server)
        .get_status(&Context::background(), "DK-1")
        .await
        .unwrap();
    assert_eq!(status.order_id, "INV-VA-1");
    assert_eq!(status.status, Status::Success);
    assert_eq!(status.paid_amount, 75_000);
    assert_eq!(status.payment_type, Some(PaymentType::VaBca));
    assert!(status.paid_at.is_some());
}

#[tokio::test]
async fn test_cancel_is_unimplemented() {
    let server = MockServer::start().await;
    let err = provider(&server)
        .cancel(&Context::background(), "DK-1")
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Unimplemented(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_notification_round_trip() {
    let server = MockServer::start().await;
    let provider = provider(&server);
    let body = json!({
        "order": {"invoice_number": "INV-VA-1", "amount": 75000},
        "transaction": {"id": "DK-1", "status": "SUCCESS"}
    })
    .to_string();
    let signature = request_signature(CLIENT_ID, SECRET_KEY, "1700000000", body.as_bytes());

    let request = WebhookRequest::from_parts(
        [
            ("Client-Id", CLIENT_ID),
            ("Request-Timestamp", "1700000000"),
            ("Signature", signature.as_str()),
        ],
        body.clone(),
    )
    .unwrap();
    assert!(provider.verify_webhook(&request));
    let event = provider.parse_webhook(&request).unwrap();
    assert_eq!(event.order_id, "INV-VA-1");
    assert_eq!(event.status, Status::Success);

    let forged = WebhookRequest::from_parts(
        [("Request-Timestamp", "1700000000"), ("Signature", "CID:00")],
        body,
    )
    .unwrap();
    assert!(!provider.verify_webhook(&forged));
}

#[tokio::test]
async fn test_registered_factory() {
    pay_doku::register();
    assert!(pay_core::registry::is_registered("doku"));

    let config = ProviderConfig::new(Environment::Sandbox, SECRET_KEY).with_client_key(CLIENT_ID);
    let provider = pay_core::registry::create("doku", config).unwrap();
    assert_eq!(provider.name(), "doku");
}
