//! Gated log sink for driver chatter. Silent unless `log_enabled` is set;
//! spans from `#[instrument]` are unaffected.

use std::fmt;

#[derive(Debug, Clone, Copy)]
pub struct Logger {
    enabled: bool,
    provider: &'static str,
}

impl Logger {
    pub fn new(provider: &'static str, enabled: bool) -> Self {
        Self { enabled, provider }
    }

    pub fn disabled(provider: &'static str) -> Self {
        Self::new(provider, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn print(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            tracing::info!(provider = self.provider, "{}", args);
        }
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            tracing::warn!(provider = self.provider, "{}", args);
        }
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            tracing::error!(provider = self.provider, "{}", args);
        }
    }
}
