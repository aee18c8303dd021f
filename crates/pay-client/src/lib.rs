//! # pay-client
//!
//! One client for Midtrans, Xendit and Doku.
//!
//! The client builds its configuration from explicit options layered over
//! `PG_*` environment variables, asks the provider registry for a driver and
//! forwards every call to it.
//!
//! ```rust,ignore
//! use pay_client::Client;
//! use pay_core::{ChargeParams, Config, Context, Customer, PaymentType};
//!
//! let client = Client::new(
//!     Config::builder()
//!         .provider("midtrans")
//!         .server_key("SB-Mid-server-...")
//!         .sandbox(),
//! )?;
//!
//! let charge = client
//!     .create_charge(&Context::background(), &ChargeParams::new(
//!         "ORDER-1",
//!         50_000,
//!         PaymentType::GoPay,
//!         Customer::new("CUST-1", "Budi", "budi@example.com", "+628123456789"),
//!     ))
//!     .await?;
//! ```
//!
//! ## Webhooks
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/webhook/{provider}` | Verified gateway notification |

pub mod client;
pub mod telemetry;
pub mod webhook;

use std::sync::Once;

pub use client::Client;
pub use telemetry::{init_tracing, try_init_tracing, LogFormat};
pub use webhook::{
    dispatch_webhook_event, serve, webhook_router, ErrorResponse, LoggingWebhookHandler,
    WebhookHandler,
};

static REGISTER: Once = Once::new();

/// Registers the bundled drivers with the global registry.
///
/// Idempotent. [`Client::new`] calls it, so it is only needed when creating
/// providers straight from `pay_core::registry`.
pub fn register_default_providers() {
    REGISTER.call_once(|| {
        pay_midtrans::register();
        pay_xendit::register();
        pay_doku::register();
    });
}
