//! # Doku Provider

use crate::config::Endpoints;
use crate::mapper::{self, DokuResponse, StatusRequest};
use crate::signature::{
    request_signature, SignatureVerifier, CLIENT_ID_HEADER, REQUEST_ID_HEADER,
    REQUEST_TIMESTAMP_HEADER, SIGNATURE_HEADER,
};
use crate::PROVIDER_NAME;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use pay_core::config::validate_credentials;
use pay_core::validation::validate_charge_params;
use pay_core::{
    BoxedTransport, ChargeParams, ChargeResponse, Context, HttpClient, HttpRequest, Logger,
    PaymentError, PaymentResult, PaymentStatus, PaymentType, Provider, ProviderConfig,
    ReqwestTransport, ValidationRules, WebhookEvent, WebhookRequest, WebhookVerifier,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SUPPORTED: [PaymentType; 12] = [
    PaymentType::GoPay,
    PaymentType::Ovo,
    PaymentType::Dana,
    PaymentType::ShopeePay,
    PaymentType::LinkAja,
    PaymentType::VaBca,
    PaymentType::VaBni,
    PaymentType::VaBri,
    PaymentType::VaMandiri,
    PaymentType::VaPermata,
    PaymentType::VaCimb,
    PaymentType::Qris,
];

/// `client_key` is the Doku Client-Id, `server_key` the HMAC secret
pub struct DokuProvider {
    config: ProviderConfig,
    endpoints: Endpoints,
    http: HttpClient,
    verifier: SignatureVerifier,
    logger: Logger,
}

impl DokuProvider {
    pub fn new(config: ProviderConfig) -> PaymentResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ProviderConfig, transport: BoxedTransport) -> PaymentResult<Self> {
        validate_credentials(PROVIDER_NAME, &config)?;
        let endpoints = Endpoints::new(&config)?;
        let http = HttpClient::new(transport, config.timeout, mapper::decode_error);
        Ok(Self {
            verifier: SignatureVerifier::new(config.client_key.clone(), config.server_key.clone()),
            logger: Logger::new(PROVIDER_NAME, config.log_enabled),
            config,
            endpoints,
            http,
        })
    }

    /// Encodes `body` once so the signature covers the exact bytes sent
    fn signed_post<T: Serialize>(&self, url: String, body: &T) -> PaymentResult<HttpRequest> {
        let encoded = serde_json::to_vec(body)
            .map_err(|e| PaymentError::InvalidPayload(format!("failed to encode request: {}", e)))?;
        let timestamp = Utc::now().timestamp().to_string();
        let signature = request_signature(
            &self.config.client_key,
            &self.config.server_key,
            &timestamp,
            &encoded,
        );
        let request_id = Uuid::new_v4().to_string();
        debug!(request_id = %request_id, "signed doku request");

        Ok(HttpRequest::post(url)
            .header(CLIENT_ID_HEADER, self.config.client_key.as_str())
            .header(REQUEST_ID_HEADER, request_id)
            .header(REQUEST_TIMESTAMP_HEADER, timestamp)
            .header(SIGNATURE_HEADER, signature)
            .raw_body(Bytes::from(encoded)))
    }
}

#[async_trait]
impl Provider for DokuProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, ctx, params), fields(order_id = %params.order_id, payment_type = %params.payment_type))]
    async fn create_charge(
        &self,
        ctx: &Context,
        params: &ChargeParams,
    ) -> PaymentResult<ChargeResponse> {
        validate_charge_params(params, &ValidationRules::new(&SUPPORTED))?;
        self.logger
            .print(format_args!("charge {} ({})", params.order_id, params.payment_type));

        let body = mapper::to_payment_request(params, Utc::now())?;
        let request = self.signed_post(self.endpoints.payment_url(), &body)?;

        let charge = async {
            let (response, raw): (DokuResponse, Value) =
                self.http.call_with_raw(ctx, request).await?;
            mapper::check_envelope(&response, &raw)?;
            Ok::<_, PaymentError>(mapper::to_charge_response(response, raw, params))
        }
        .await
        .inspect_err(|e| {
            self.logger.error(format_args!("charge {} failed: {}", params.order_id, e));
        })?;

        info!(
            transaction_id = %charge.transaction_id,
            status = %charge.status.as_str(),
            "created doku charge"
        );
        Ok(charge)
    }

    /// `order_id` is the Doku transaction id
    #[instrument(skip(self, ctx))]
    async fn get_status(&self, ctx: &Context, order_id: &str) -> PaymentResult<PaymentStatus> {
        let body = StatusRequest {
            transaction_id: order_id.to_string(),
        };
        let request = self.signed_post(self.endpoints.transaction_url(), &body)?;
        let (response, raw): (DokuResponse, Value) = self.http.call_with_raw(ctx, request).await?;
        mapper::check_envelope(&response, &raw)?;
        Ok(mapper::to_payment_status(response, raw, order_id))
    }

    async fn cancel(&self, _ctx: &Context, order_id: &str) -> PaymentResult<()> {
        debug!(order_id, "doku has no cancel endpoint");
        Err(PaymentError::Unimplemented(
            "payment expires automatically".to_string(),
        ))
    }

    fn verify_webhook(&self, request: &WebhookRequest) -> bool {
        self.verifier.verify(request)
    }

    fn parse_webhook(&self, request: &WebhookRequest) -> PaymentResult<WebhookEvent> {
        mapper::to_webhook_event(request.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::{Environment, ErrorKind};

    #[test]
    fn test_client_id_required() {
        let err = DokuProvider::new(ProviderConfig::new(Environment::Sandbox, "SK"))
            .err()
            .unwrap();
        assert!(err.is(ErrorKind::MissingCredentials));

        let config = ProviderConfig::new(Environment::Sandbox, "SK").with_client_key("CID");
        assert!(DokuProvider::new(config).is_ok());
    }

    #[test]
    fn test_signed_post_headers() {
        let config = ProviderConfig::new(Environment::Sandbox, "SK").with_client_key("CID");
        let provider = DokuProvider::new(config).unwrap();
        let request = provider
            .signed_post("https://example.test/payments/v2".to_string(), &serde_json::json!({"a": 1}))
            .unwrap();

        let timestamp = request.header_value(REQUEST_TIMESTAMP_HEADER).unwrap();
        let body = request.body.clone().unwrap();
        assert_eq!(body.as_ref(), br#"{"a":1}"#);
        assert_eq!(
            request.header_value(SIGNATURE_HEADER).unwrap(),
            request_signature("CID", "SK", timestamp, &body)
        );
        assert_eq!(request.header_value(CLIENT_ID_HEADER), Some("CID"));
        assert!(Uuid::parse_str(request.header_value(REQUEST_ID_HEADER).unwrap()).is_ok());
    }
}
