//! # Midtrans Endpoints
//!
//! Host selection per environment. Core API and Snap live on different
//! hosts; an `api_base_url` override points both at the same place.

use pay_core::transport::{endpoint, parse_base_url};
use pay_core::{Environment, PaymentResult, ProviderConfig};
use url::Url;

pub const SANDBOX_API_URL: &str = "https://api.sandbox.midtrans.com";
pub const PRODUCTION_API_URL: &str = "https://api.midtrans.com";
pub const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com";
pub const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com";

#[derive(Debug, Clone)]
pub struct Endpoints {
    api: Url,
    snap: Url,
}

impl Endpoints {
    pub fn new(config: &ProviderConfig) -> PaymentResult<Self> {
        if let Some(base) = &config.api_base_url {
            let url = parse_base_url(base)?;
            return Ok(Self {
                api: url.clone(),
                snap: url,
            });
        }

        let (api, snap) = match config.environment {
            Environment::Sandbox => (SANDBOX_API_URL, SANDBOX_SNAP_URL),
            Environment::Production => (PRODUCTION_API_URL, PRODUCTION_SNAP_URL),
        };
        Ok(Self {
            api: parse_base_url(api)?,
            snap: parse_base_url(snap)?,
        })
    }

    pub fn charge_url(&self) -> String {
        endpoint(&self.api, &["v2", "charge"])
    }

    pub fn status_url(&self, order_id: &str) -> String {
        endpoint(&self.api, &["v2", order_id, "status"])
    }

    pub fn cancel_url(&self, order_id: &str) -> String {
        endpoint(&self.api, &["v2", order_id, "cancel"])
    }

    pub fn snap_url(&self) -> String {
        endpoint(&self.snap, &["snap", "v1", "transactions"])
    }
}
