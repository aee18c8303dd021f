//! # Client
//!
//! Thin facade over a single provider instance.

use crate::register_default_providers;
use pay_core::{
    registry, BoxedProvider, ChargeParams, ChargeResponse, Config, ConfigBuilder, Context,
    PaymentError, PaymentResult, PaymentStatus, WebhookEvent, WebhookRequest,
};
use tracing::{debug, info, instrument, warn};

/// Configured gateway client; safe to share across tasks
#[derive(Clone)]
pub struct Client {
    config: Config,
    provider: BoxedProvider,
}

impl Client {
    /// Builds the configuration and resolves the driver by name.
    ///
    /// Configuration and credential errors surface here, before any I/O.
    pub fn new(builder: ConfigBuilder) -> PaymentResult<Self> {
        register_default_providers();
        let config = builder.build()?;
        let provider = registry::create(&config.provider, config.provider_config.clone())?;
        info!(
            provider = %config.provider,
            environment = %config.environment().as_str(),
            "payment client ready"
        );
        Ok(Self { config, provider })
    }

    /// Configuration from `.env` and `PG_*` variables only
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(ConfigBuilder::from_dotenv())
    }

    /// Wraps an already constructed driver
    pub fn with_provider(config: Config, provider: BoxedProvider) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &BoxedProvider {
        &self.provider
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    #[instrument(skip(self, ctx, params), fields(provider = self.provider.name(), order_id = %params.order_id))]
    pub async fn create_charge(
        &self,
        ctx: &Context,
        params: &ChargeParams,
    ) -> PaymentResult<ChargeResponse> {
        self.provider.create_charge(ctx, params).await
    }

    #[instrument(skip(self, ctx), fields(provider = self.provider.name()))]
    pub async fn get_status(&self, ctx: &Context, order_id: &str) -> PaymentResult<PaymentStatus> {
        self.provider.get_status(ctx, order_id).await
    }

    #[instrument(skip(self, ctx), fields(provider = self.provider.name()))]
    pub async fn cancel(&self, ctx: &Context, order_id: &str) -> PaymentResult<()> {
        self.provider.cancel(ctx, order_id).await
    }

    pub fn verify_webhook(&self, request: &WebhookRequest) -> bool {
        self.provider.verify_webhook(request)
    }

    /// Verifies, then parses. Unverified requests yield `InvalidSignature`.
    pub fn parse_webhook(&self, request: &WebhookRequest) -> PaymentResult<WebhookEvent> {
        if !self.provider.verify_webhook(request) {
            warn!(provider = self.provider.name(), "webhook signature rejected");
            return Err(PaymentError::InvalidSignature);
        }
        let event = self.provider.parse_webhook(request)?;
        debug!(
            order_id = %event.order_id,
            event_type = %event.event_type,
            "parsed webhook"
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::{EnvSource, Environment, ErrorKind, Status};
    use std::collections::HashMap;

    fn midtrans() -> Client {
        Client::new(
            Config::builder()
                .provider("Midtrans")
                .server_key("SB-Mid-server-XYZ")
                .without_env(),
        )
        .unwrap()
    }

    #[test]
    fn test_resolves_provider_by_name() {
        let client = midtrans();
        assert_eq!(client.provider_name(), "midtrans");
        assert_eq!(client.config().environment(), Environment::Sandbox);
    }

    #[test]
    fn test_sandbox_key_in_production_fails_at_construction() {
        let err = Client::new(
            Config::builder()
                .provider("midtrans")
                .server_key("SB-Mid-server-XYZ")
                .production()
                .without_env(),
        )
        .err()
        .unwrap();
        assert!(err.is(ErrorKind::InvalidCredentials));
    }

    #[test]
    fn test_unknown_provider() {
        let err = Client::new(
            Config::builder()
                .provider("ipaymu")
                .server_key("key")
                .without_env(),
        )
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedProvider);
    }

    #[test]
    fn test_environment_overlay() {
        let vars = HashMap::from([
            ("PG_PROVIDER".to_string(), "xendit".to_string()),
            ("PG_SERVER_KEY".to_string(), "xnd_development_abc".to_string()),
        ]);
        let client = Client::new(Config::builder().env_source(EnvSource::Map(vars))).unwrap();
        assert_eq!(client.provider_name(), "xendit");
    }

    #[test]
    fn test_parse_webhook_requires_signature() {
        let client = midtrans();
        let body = serde_json::json!({
            "order_id": "O1",
            "status_code": "200",
            "gross_amount": "50000",
            "transaction_status": "settlement",
            "signature_key": pay_midtrans::notification_signature("O1", "200", "50000", "SB-Mid-server-XYZ"),
        })
        .to_string();

        let request = WebhookRequest::from_parts([("content-type", "application/json")], body).unwrap();
        let event = client.parse_webhook(&request).unwrap();
        assert_eq!(event.status, Status::Success);

        let forged = serde_json::json!({
            "order_id": "O1",
            "status_code": "200",
            "gross_amount": "50000",
            "transaction_status": "settlement",
            "signature_key": "00",
        })
        .to_string();
        let request = WebhookRequest::from_parts([], forged).unwrap();
        assert!(matches!(
            client.parse_webhook(&request),
            Err(PaymentError::InvalidSignature)
        ));
    }
}
