//! # Xendit Provider

use crate::config::Endpoints;
use crate::mapper::{
    self, route, route_for_id, CallbackVaResponse, EwalletChargeResponse, InvoiceResponse, Route,
};
use crate::webhook::{parse_callback, CallbackTokenVerifier};
use crate::PROVIDER_NAME;
use async_trait::async_trait;
use chrono::Utc;
use pay_core::config::validate_credentials;
use pay_core::validation::validate_charge_params;
use pay_core::{
    BoxedTransport, ChargeParams, ChargeResponse, Context, ErrorKind, HttpClient, HttpRequest,
    Logger, PaymentResult, PaymentStatus, PaymentType, Provider, ProviderConfig, ReqwestTransport,
    ValidationRules, WebhookEvent, WebhookRequest, WebhookVerifier,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct XenditProvider {
    config: ProviderConfig,
    endpoints: Endpoints,
    http: HttpClient,
    verifier: CallbackTokenVerifier,
    logger: Logger,
}

impl XenditProvider {
    /// Provider backed by the default reqwest transport
    pub fn new(config: ProviderConfig) -> PaymentResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// `client_key` doubles as the callback verification token
    pub fn with_transport(config: ProviderConfig, transport: BoxedTransport) -> PaymentResult<Self> {
        validate_credentials(PROVIDER_NAME, &config)?;
        let endpoints = Endpoints::new(&config)?;
        let http = HttpClient::new(transport, config.timeout, mapper::decode_error);
        Ok(Self {
            verifier: CallbackTokenVerifier::new(config.client_key.clone()),
            logger: Logger::new(PROVIDER_NAME, config.log_enabled),
            config,
            endpoints,
            http,
        })
    }

    fn request(&self, request: HttpRequest) -> HttpRequest {
        request.basic_auth(&self.config.server_key, "")
    }

    async fn charge_ewallet(
        &self,
        ctx: &Context,
        params: &ChargeParams,
    ) -> PaymentResult<ChargeResponse> {
        let body = mapper::to_ewallet_request(params)?;
        debug!(channel = body.channel_code, checkout_method = %body.checkout_method, "creating e-wallet charge");

        let request = self.request(HttpRequest::post(self.endpoints.ewallet_url())).json(&body)?;
        let (response, raw): (EwalletChargeResponse, Value) =
            self.http.call_with_raw(ctx, request).await?;
        Ok(mapper::ewallet_to_charge_response(response, raw, params))
    }

    async fn charge_virtual_account(
        &self,
        ctx: &Context,
        params: &ChargeParams,
    ) -> PaymentResult<ChargeResponse> {
        let body = mapper::to_callback_va_request(params)?;
        debug!(bank_code = %body.bank_code, "creating callback virtual account");

        let request = self
            .request(HttpRequest::post(self.endpoints.callback_va_url()))
            .json(&body)?;
        let (response, raw): (CallbackVaResponse, Value) =
            self.http.call_with_raw(ctx, request).await?;
        Ok(mapper::callback_va_to_charge_response(response, raw, &body))
    }

    async fn charge_invoice(
        &self,
        ctx: &Context,
        params: &ChargeParams,
    ) -> PaymentResult<ChargeResponse> {
        let body = mapper::to_invoice_request(params, Utc::now());
        debug!(methods = ?body.payment_methods, "creating invoice");

        let request = self.request(HttpRequest::post(self.endpoints.invoices_url())).json(&body)?;
        let (response, raw): (InvoiceResponse, Value) = self.http.call_with_raw(ctx, request).await?;
        Ok(mapper::invoice_to_charge_response(response, raw, params))
    }

    async fn invoice_status(&self, ctx: &Context, id: &str) -> PaymentResult<PaymentStatus> {
        let request = self.request(HttpRequest::get(self.endpoints.invoice_url(id)));
        let (response, raw): (InvoiceResponse, Value) = self.http.call_with_raw(ctx, request).await?;
        Ok(mapper::invoice_to_payment_status(response, raw))
    }

    async fn virtual_account_status(&self, ctx: &Context, id: &str) -> PaymentResult<PaymentStatus> {
        let request = self.request(HttpRequest::get(self.endpoints.callback_va_by_id_url(id)));
        let (response, raw): (CallbackVaResponse, Value) =
            self.http.call_with_raw(ctx, request).await?;
        Ok(mapper::callback_va_to_payment_status(response, raw, Utc::now()))
    }

    async fn ewallet_status(&self, ctx: &Context, id: &str) -> PaymentResult<PaymentStatus> {
        let request = self.request(HttpRequest::get(self.endpoints.ewallet_charge_url(id)));
        let (response, raw): (EwalletChargeResponse, Value) =
            self.http.call_with_raw(ctx, request).await?;
        Ok(mapper::ewallet_to_payment_status(response, raw))
    }

    async fn expire_invoice(&self, ctx: &Context, id: &str) -> PaymentResult<()> {
        let request = self
            .request(HttpRequest::patch(self.endpoints.invoice_url(id)))
            .json(&mapper::expire_invoice_request(Utc::now()))?;
        let _: InvoiceResponse = self.http.call(ctx, request).await?;
        info!("expired xendit invoice");
        Ok(())
    }

    async fn expire_virtual_account(&self, ctx: &Context, id: &str) -> PaymentResult<()> {
        let request = self
            .request(HttpRequest::patch(self.endpoints.callback_va_by_id_url(id)))
            .json(&mapper::expire_va_request(Utc::now()))?;
        let _: CallbackVaResponse = self.http.call(ctx, request).await?;
        info!("expired xendit virtual account");
        Ok(())
    }

    async fn void_ewallet(&self, ctx: &Context, id: &str) -> PaymentResult<()> {
        let request = self.request(HttpRequest::post(self.endpoints.ewallet_void_url(id)));
        let _: EwalletChargeResponse = self.http.call(ctx, request).await?;
        info!("voided xendit e-wallet charge");
        Ok(())
    }
}

#[async_trait]
impl Provider for XenditProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, ctx, params), fields(order_id = %params.order_id, payment_type = %params.payment_type))]
    async fn create_charge(
        &self,
        ctx: &Context,
        params: &ChargeParams,
    ) -> PaymentResult<ChargeResponse> {
        validate_charge_params(params, &ValidationRules::new(&PaymentType::ALL))?;
        self.logger
            .print(format_args!("charge {} ({})", params.order_id, params.payment_type));

        let charge = match route(params.payment_type) {
            Route::Ewallet => self.charge_ewallet(ctx, params).await,
            Route::CallbackVirtualAccount => self.charge_virtual_account(ctx, params).await,
            Route::Invoice => self.charge_invoice(ctx, params).await,
        }
        .inspect_err(|e| {
            self.logger.error(format_args!("charge {} failed: {}", params.order_id, e));
        })?;

        info!(
            transaction_id = %charge.transaction_id,
            status = %charge.status.as_str(),
            "created xendit charge"
        );
        Ok(charge)
    }

    /// `order_id` is the `transaction_id` of a charge. Ids that are not
    /// invoices fall through to the callback VA lookup.
    #[instrument(skip(self, ctx))]
    async fn get_status(&self, ctx: &Context, order_id: &str) -> PaymentResult<PaymentStatus> {
        match route_for_id(order_id) {
            Route::Ewallet => self.ewallet_status(ctx, order_id).await,
            _ => match self.invoice_status(ctx, order_id).await {
                Err(e) if e.is(ErrorKind::TransactionNotFound) => {
                    debug!("no invoice, trying callback virtual account");
                    self.virtual_account_status(ctx, order_id).await
                }
                other => other,
            },
        }
    }

    #[instrument(skip(self, ctx))]
    async fn cancel(&self, ctx: &Context, order_id: &str) -> PaymentResult<()> {
        match route_for_id(order_id) {
            Route::Ewallet => self.void_ewallet(ctx, order_id).await,
            _ => match self.expire_invoice(ctx, order_id).await {
                Err(e) if e.is(ErrorKind::TransactionNotFound) => {
                    debug!("no invoice, expiring callback virtual account");
                    self.expire_virtual_account(ctx, order_id).await
                }
                other => other,
            },
        }
    }

    fn verify_webhook(&self, request: &WebhookRequest) -> bool {
        self.verifier.verify(request)
    }

    fn parse_webhook(&self, request: &WebhookRequest) -> PaymentResult<WebhookEvent> {
        parse_callback(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::Environment;

    #[test]
    fn test_key_must_match_environment() {
        let config = ProviderConfig::new(Environment::Production, "xnd_development_abc");
        let err = XenditProvider::new(config).err().unwrap();
        assert!(err.is(ErrorKind::InvalidCredentials));

        let config = ProviderConfig::new(Environment::Production, "xnd_production_abc");
        assert!(XenditProvider::new(config).is_ok());
    }
}
