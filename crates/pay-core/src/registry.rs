//! # Provider Registry
//!
//! Name → factory table. Drivers install themselves with [`register`]
//! (each driver crate exposes a `register()` that does this); the client
//! resolves its provider with [`create`].
//!
//! Rust has no static constructors, so registration is explicit: call the
//! driver `register()` functions (or `pay_client::register_default_providers`)
//! before building a client. Registering an existing name replaces it.

use crate::config::ProviderConfig;
use crate::error::{PaymentError, PaymentResult};
use crate::provider::BoxedProvider;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Builds a provider from its configuration
pub type ProviderFactory = Arc<dyn Fn(ProviderConfig) -> PaymentResult<BoxedProvider> + Send + Sync>;

/// A name → factory table guarded by a reader-writer lock
#[derive(Default)]
pub struct Registry {
    factories: RwLock<HashMap<String, ProviderFactory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last registration for a name wins
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(ProviderConfig) -> PaymentResult<BoxedProvider> + Send + Sync + 'static,
    {
        let name = name.into().to_ascii_lowercase();
        tracing::debug!(provider = %name, "registering payment provider");
        self.factories.write().insert(name, Arc::new(factory));
    }

    pub fn create(&self, name: &str, config: ProviderConfig) -> PaymentResult<BoxedProvider> {
        let factory = self
            .factories
            .read()
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| PaymentError::UnsupportedProvider {
                name: name.to_string(),
            })?;
        factory(config)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.read().contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process-wide registry
pub fn global() -> &'static Registry {
    &GLOBAL
}

pub fn register<F>(name: impl Into<String>, factory: F)
where
    F: Fn(ProviderConfig) -> PaymentResult<BoxedProvider> + Send + Sync + 'static,
{
    GLOBAL.register(name, factory);
}

pub fn create(name: &str, config: ProviderConfig) -> PaymentResult<BoxedProvider> {
    GLOBAL.create(name, config)
}

pub fn is_registered(name: &str) -> bool {
    GLOBAL.contains(name)
}

pub fn registered_providers() -> Vec<String> {
    GLOBAL.names()
}
