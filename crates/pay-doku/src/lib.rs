//! # pay-doku
//!
//! Doku driver for paygate-rs.
//!
//! Every request is signed: the body is hashed with SHA-512 and the digest,
//! `Client-Id` and `Request-Timestamp` are HMAC-SHA512'd with the secret key.
//! Notifications carry the same headers and are checked with the same recipe.
//!
//! `client_key` holds the Client-Id and `server_key` the secret key. Doku has
//! no cancel endpoint, so [`Provider::cancel`](pay_core::Provider::cancel)
//! returns `Unimplemented`.

pub mod config;
pub mod driver;
pub mod mapper;
pub mod signature;

use pay_core::BoxedProvider;
use std::sync::Arc;

pub use config::Endpoints;
pub use driver::DokuProvider;
pub use signature::{request_signature, SignatureVerifier};

pub const PROVIDER_NAME: &str = "doku";

/// Adds the Doku factory to the global registry
pub fn register() {
    pay_core::registry::register(PROVIDER_NAME, |config| {
        Ok(Arc::new(DokuProvider::new(config)?) as BoxedProvider)
    });
}
