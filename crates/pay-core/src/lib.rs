//! # pay-core
//!
//! Core types and traits shared by the paygate gateway drivers.
//!
//! This crate provides:
//! - `Provider` trait implemented by each gateway driver
//! - `ChargeParams`, `ChargeResponse`, `PaymentStatus` and `WebhookEvent` for the unified model
//! - `Registry` mapping provider names to factories
//! - `ConfigBuilder` for layered, validated configuration
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{ChargeParams, Context, Customer, Item, PaymentType};
//!
//! let params = ChargeParams::new(
//!     "ORDER-1",
//!     50_000,
//!     PaymentType::GoPay,
//!     Customer::new("C1", "Budi", "budi@example.com", "081234567890"),
//! )
//! .with_item(Item::new("SKU-1", "Kopi", 50_000, 1));
//!
//! let provider = pay_core::registry::create("midtrans", config)?;
//! let charge = provider.create_charge(&Context::background(), &params).await?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod logger;
pub mod model;
pub mod payment_type;
pub mod provider;
pub mod registry;
pub mod signature;
pub mod transport;
pub mod validation;
pub mod webhook;

// Re-exports for convenience
pub use config::{Config, ConfigBuilder, EnvSource, ProviderConfig};
pub use context::{CancelHandle, Context};
pub use error::{
    ErrorKind, FieldError, PaymentError, PaymentResult, ProviderError, ValidationError,
};
pub use logger::Logger;
pub use model::{
    ChargeParams, ChargeResponse, Customer, Item, PaymentStatus, WebhookEvent, WebhookEventType,
};
pub use payment_type::{Environment, PaymentClass, PaymentType, Status};
pub use provider::{BoxedProvider, Provider};
pub use registry::{ProviderFactory, Registry};
pub use transport::{
    BoxedTransport, HttpClient, HttpRequest, HttpResponse, ReqwestTransport, Transport,
};
pub use validation::ValidationRules;
pub use webhook::{WebhookRequest, WebhookVerifier};
