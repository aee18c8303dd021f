//! # pay-midtrans
//!
//! Midtrans driver for paygate-rs.
//!
//! Two charge flows are supported:
//!
//! 1. **Core API** (default) - direct charges for e-wallets, QRIS, bank
//!    transfer VAs, Mandiri bill payment and convenience stores
//! 2. **Snap** (`snap_mode = true`) - hosted checkout page; the charge
//!    response carries the Snap token and redirect URL
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_core::{Context, Provider, ProviderConfig, Environment};
//! use pay_midtrans::MidtransProvider;
//!
//! let provider = MidtransProvider::new(
//!     ProviderConfig::new(Environment::Sandbox, "SB-Mid-server-XYZ"),
//! )?;
//! let charge = provider.create_charge(&Context::background(), &params).await?;
//! ```
//!
//! Or register it and let the client resolve it by name:
//!
//! ```rust,ignore
//! pay_midtrans::register();
//! let provider = pay_core::registry::create("midtrans", config)?;
//! ```

pub mod config;
pub mod driver;
pub mod mapper;
pub mod webhook;

use pay_core::BoxedProvider;
use std::sync::Arc;

pub use config::Endpoints;
pub use driver::MidtransProvider;
pub use webhook::{notification_signature, SignatureVerifier};

pub const PROVIDER_NAME: &str = "midtrans";

/// Adds the Midtrans factory to the global registry
pub fn register() {
    pay_core::registry::register(PROVIDER_NAME, |config| {
        Ok(Arc::new(MidtransProvider::new(config)?) as BoxedProvider)
    });
}
