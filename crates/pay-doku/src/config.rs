//! # Doku Endpoints

use pay_core::transport::{endpoint, parse_base_url};
use pay_core::{Environment, PaymentResult, ProviderConfig};
use url::Url;

pub const SANDBOX_API_URL: &str = "https://api-sandbox.doku.com";
pub const PRODUCTION_API_URL: &str = "https://api.doku.com";

#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(config: &ProviderConfig) -> PaymentResult<Self> {
        let base = match (&config.api_base_url, config.environment) {
            (Some(url), _) => url.as_str(),
            (None, Environment::Sandbox) => SANDBOX_API_URL,
            (None, Environment::Production) => PRODUCTION_API_URL,
        };
        Ok(Self {
            base: parse_base_url(base)?,
        })
    }

    pub fn payment_url(&self) -> String {
        endpoint(&self.base, &["payments", "v2"])
    }

    pub fn transaction_url(&self) -> String {
        endpoint(&self.base, &["transactions", "v2"])
    }
}
