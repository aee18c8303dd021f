//! # pay-xendit
//!
//! Xendit driver for paygate-rs.
//!
//! Charges are routed to the Xendit product that fits the method:
//! e-wallet charges (GoPay, OVO, DANA, LinkAja, ShopeePay, QRIS), fixed
//! amount callback virtual accounts, and invoices for retail outlets and
//! cards. Authentication is HTTP Basic with the secret key as username.
//!
//! ## Callbacks
//!
//! Set `client_key` to the dashboard's callback verification token. Callbacks
//! whose `X-Callback-Token` does not match are rejected.
//!
//! ```rust,ignore
//! let provider = XenditProvider::new(
//!     ProviderConfig::new(Environment::Sandbox, "xnd_development_...")
//!         .with_client_key(callback_token),
//! )?;
//! if provider.verify_webhook(&request) {
//!     let event = provider.parse_webhook(&request)?;
//! }
//! ```

pub mod config;
pub mod driver;
pub mod mapper;
pub mod webhook;

use pay_core::BoxedProvider;
use std::sync::Arc;

pub use config::Endpoints;
pub use driver::XenditProvider;
pub use webhook::{CallbackTokenVerifier, CALLBACK_TOKEN_HEADER};

pub const PROVIDER_NAME: &str = "xendit";

/// Adds the Xendit factory to the global registry
pub fn register() {
    pay_core::registry::register(PROVIDER_NAME, |config| {
        Ok(Arc::new(XenditProvider::new(config)?) as BoxedProvider)
    });
}
