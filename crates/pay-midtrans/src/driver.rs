//! # Midtrans Provider
//!
//! Core API charges by default; hosted Snap checkout when `snap_mode` is on.
//! Status and cancel always go through the Core API.

use crate::config::Endpoints;
use crate::mapper::{self, CoreResponse, SnapResponse};
use crate::webhook::{parse_notification, SignatureVerifier};
use crate::PROVIDER_NAME;
use async_trait::async_trait;
use chrono::Utc;
use pay_core::config::validate_credentials;
use pay_core::validation::validate_charge_params;
use pay_core::{
    BoxedTransport, ChargeParams, ChargeResponse, Context, HttpClient, HttpRequest, Logger,
    PaymentResult, PaymentStatus, PaymentType, Provider, ProviderConfig, ReqwestTransport,
    ValidationRules, WebhookEvent, WebhookRequest, WebhookVerifier,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

const CANCEL_REASON: &str = "User requested cancellation";

pub struct MidtransProvider {
    config: ProviderConfig,
    endpoints: Endpoints,
    http: HttpClient,
    verifier: SignatureVerifier,
    logger: Logger,
}

impl MidtransProvider {
    /// Provider backed by the default reqwest transport
    pub fn new(config: ProviderConfig) -> PaymentResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ProviderConfig, transport: BoxedTransport) -> PaymentResult<Self> {
        validate_credentials(PROVIDER_NAME, &config)?;
        let endpoints = Endpoints::new(&config)?;
        let http = HttpClient::new(transport, config.timeout, mapper::decode_error);
        Ok(Self {
            verifier: SignatureVerifier::new(config.server_key.clone()),
            logger: Logger::new(PROVIDER_NAME, config.log_enabled),
            config,
            endpoints,
            http,
        })
    }

    pub fn is_snap(&self) -> bool {
        self.config.snap_mode
    }

    fn rules(&self) -> ValidationRules<'static> {
        ValidationRules::new(&PaymentType::ALL).require_items(true)
    }

    fn request(&self, request: HttpRequest) -> HttpRequest {
        request.basic_auth(&self.config.server_key, "")
    }

    async fn create_snap(&self, ctx: &Context, params: &ChargeParams) -> PaymentResult<ChargeResponse> {
        let body = mapper::to_snap_request(params, Utc::now());
        let request = self.request(HttpRequest::post(self.endpoints.snap_url())).json(&body)?;

        let (response, raw): (SnapResponse, Value) = self.http.call_with_raw(ctx, request).await?;
        info!(token = %response.token, "created snap transaction");
        Ok(mapper::snap_to_charge_response(response, raw, params))
    }
}

#[async_trait]
impl Provider for MidtransProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, ctx, params), fields(order_id = %params.order_id, payment_type = %params.payment_type))]
    async fn create_charge(
        &self,
        ctx: &Context,
        params: &ChargeParams,
    ) -> PaymentResult<ChargeResponse> {
        validate_charge_params(params, &self.rules())?;

        if self.is_snap() {
            return self.create_snap(ctx, params).await;
        }

        let body = mapper::to_charge_request(params, Utc::now())?;
        debug!(wire_type = body.payment_type, "creating core api charge");
        self.logger
            .print(format_args!("charge {} via {}", params.order_id, body.payment_type));

        let request = self.request(HttpRequest::post(self.endpoints.charge_url())).json(&body)?;
        let (response, raw): (CoreResponse, Value) = self.http.call_with_raw(ctx, request).await?;
        mapper::check_envelope(&response, &raw).inspect_err(|e| {
            self.logger.error(format_args!("charge {} rejected: {}", params.order_id, e));
        })?;

        let charge = mapper::to_charge_response(response, raw, params)?;
        info!(
            transaction_id = %charge.transaction_id,
            status = %charge.status.as_str(),
            "created midtrans charge"
        );
        Ok(charge)
    }

    #[instrument(skip(self, ctx))]
    async fn get_status(&self, ctx: &Context, order_id: &str) -> PaymentResult<PaymentStatus> {
        let request = self.request(HttpRequest::get(self.endpoints.status_url(order_id)));
        let (response, raw): (CoreResponse, Value) = self.http.call_with_raw(ctx, request).await?;
        mapper::check_envelope(&response, &raw)?;
        mapper::to_payment_status(response, raw)
    }

    #[instrument(skip(self, ctx))]
    async fn cancel(&self, ctx: &Context, order_id: &str) -> PaymentResult<()> {
        let request = self
            .request(HttpRequest::post(self.endpoints.cancel_url(order_id)))
            .json(&json!({ "cancel_reason": CANCEL_REASON }))?;
        let (response, raw): (CoreResponse, Value) = self.http.call_with_raw(ctx, request).await?;
        mapper::check_envelope(&response, &raw)?;
        info!("cancelled midtrans transaction");
        Ok(())
    }

    fn verify_webhook(&self, request: &WebhookRequest) -> bool {
        self.verifier.verify(request)
    }

    fn parse_webhook(&self, request: &WebhookRequest) -> PaymentResult<WebhookEvent> {
        parse_notification(request)
    }
}
