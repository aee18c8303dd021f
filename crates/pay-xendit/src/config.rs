//! # Xendit Endpoints
//!
//! One host serves both environments; the key decides which one you hit.

use pay_core::transport::{endpoint, parse_base_url};
use pay_core::{PaymentResult, ProviderConfig};
use url::Url;

pub const API_URL: &str = "https://api.xendit.co";

#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(config: &ProviderConfig) -> PaymentResult<Self> {
        let base = config.api_base_url.as_deref().unwrap_or(API_URL);
        Ok(Self {
            base: parse_base_url(base)?,
        })
    }

    pub fn invoices_url(&self) -> String {
        endpoint(&self.base, &["v2", "invoices"])
    }

    pub fn invoice_url(&self, id: &str) -> String {
        endpoint(&self.base, &["v2", "invoices", id])
    }

    pub fn callback_va_url(&self) -> String {
        endpoint(&self.base, &["callback_virtual_accounts"])
    }

    pub fn callback_va_by_id_url(&self, id: &str) -> String {
        endpoint(&self.base, &["callback_virtual_accounts", id])
    }

    pub fn ewallet_url(&self) -> String {
        endpoint(&self.base, &["ewallets"])
    }

    pub fn ewallet_charge_url(&self, id: &str) -> String {
        endpoint(&self.base, &["ewallets", "charges", id])
    }

    pub fn ewallet_void_url(&self, id: &str) -> String {
        endpoint(&self.base, &["ewallets", "charges", id, "void"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::Environment;

    #[test]
    fn test_same_host_for_both_environments() {
        let sandbox = Endpoints::new(&ProviderConfig::new(Environment::Sandbox, "k")).unwrap();
        let production = Endpoints::new(&ProviderConfig::new(Environment::Production, "k")).unwrap();
        assert_eq!(sandbox.invoices_url(), production.invoices_url());
        assert_eq!(sandbox.invoice_url("inv-1"), "https://api.xendit.co/v2/invoices/inv-1");
        assert_eq!(sandbox.callback_va_url(), "https://api.xendit.co/callback_virtual_accounts");
        assert_eq!(sandbox.ewallet_url(), "https://api.xendit.co/ewallets");
        assert_eq!(
            sandbox.ewallet_void_url("ewc_1"),
            "https://api.xendit.co/ewallets/charges/ewc_1/void"
        );
        assert_eq!(
            sandbox.callback_va_by_id_url("va-1"),
            "https://api.xendit.co/callback_virtual_accounts/va-1"
        );
    }
}
