//! # Configuration
//!
//! Builds a validated [`Config`] from three layers, lowest first:
//!
//! 1. defaults (sandbox, 30s timeout, logging off, snap mode off)
//! 2. `PG_*` environment variables, filling only fields still empty
//! 3. explicit builder options, later calls overriding earlier ones
//!
//! Credentials are then checked against the selected provider and
//! environment. Failures surface as `InvalidConfiguration` carrying the
//! first failing field.

use crate::error::{ErrorKind, FieldError, PaymentError, PaymentResult, ValidationError};
use crate::payment_type::Environment;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub const ENV_PROVIDER: &str = "PG_PROVIDER";
pub const ENV_SERVER_KEY: &str = "PG_SERVER_KEY";
pub const ENV_CLIENT_KEY: &str = "PG_CLIENT_KEY";
pub const ENV_MERCHANT_ID: &str = "PG_MERCHANT_ID";
pub const ENV_ENVIRONMENT: &str = "PG_ENVIRONMENT";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What a provider factory receives
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub environment: Environment,
    pub server_key: String,
    pub client_key: String,
    pub merchant_id: String,
    pub timeout: Duration,
    pub snap_mode: bool,
    pub log_enabled: bool,
    /// Replaces the driver's base URL (proxies, mock servers)
    pub api_base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Sandbox,
            server_key: String::new(),
            client_key: String::new(),
            merchant_id: String::new(),
            timeout: DEFAULT_TIMEOUT,
            snap_mode: false,
            log_enabled: false,
            api_base_url: None,
        }
    }
}

impl ProviderConfig {
    pub fn new(environment: Environment, server_key: impl Into<String>) -> Self {
        Self {
            environment,
            server_key: server_key.into(),
            ..Self::default()
        }
    }

    pub fn with_client_key(mut self, key: impl Into<String>) -> Self {
        self.client_key = key.into();
        self
    }

    pub fn with_merchant_id(mut self, id: impl Into<String>) -> Self {
        self.merchant_id = id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_snap_mode(mut self, enabled: bool) -> Self {
        self.snap_mode = enabled;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_enabled = enabled;
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("environment", &self.environment)
            .field("server_key", &redact(&self.server_key))
            .field("client_key", &redact(&self.client_key))
            .field("merchant_id", &self.merchant_id)
            .field("timeout", &self.timeout)
            .field("snap_mode", &self.snap_mode)
            .field("log_enabled", &self.log_enabled)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

/// Validated client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub provider: String,
    pub provider_config: ProviderConfig,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn environment(&self) -> Environment {
        self.provider_config.environment
    }

    pub fn server_key(&self) -> &str {
        &self.provider_config.server_key
    }

    pub fn timeout(&self) -> Duration {
        self.provider_config.timeout
    }
}

/// Where the environment overlay reads from
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    #[default]
    Process,
    Map(HashMap<String, String>),
    Disabled,
}

impl EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        let value = match self {
            EnvSource::Process => std::env::var(key).ok(),
            EnvSource::Map(map) => map.get(key).cloned(),
            EnvSource::Disabled => None,
        }?;
        let value = value.trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Layered builder for [`Config`]
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    provider: Option<String>,
    server_key: Option<String>,
    client_key: Option<String>,
    merchant_id: Option<String>,
    environment: Option<String>,
    timeout: Option<Duration>,
    snap_mode: Option<bool>,
    log_enabled: Option<bool>,
    api_base_url: Option<String>,
    env: EnvSource,
}

/// Shape of a TOML configuration document
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    provider: Option<String>,
    server_key: Option<String>,
    client_key: Option<String>,
    merchant_id: Option<String>,
    environment: Option<String>,
    timeout_secs: Option<u64>,
    snap_mode: Option<bool>,
    log_enabled: Option<bool>,
    api_base_url: Option<String>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `.env` into the process environment first, if present
    pub fn from_dotenv() -> Self {
        dotenvy::dotenv().ok();
        Self::new()
    }

    pub fn env_source(mut self, source: EnvSource) -> Self {
        self.env = source;
        self
    }

    /// Skip the environment-variable layer entirely
    pub fn without_env(self) -> Self {
        self.env_source(EnvSource::Disabled)
    }

    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.provider = Some(name.into());
        self
    }

    pub fn server_key(mut self, key: impl Into<String>) -> Self {
        self.server_key = Some(key.into());
        self
    }

    pub fn client_key(mut self, key: impl Into<String>) -> Self {
        self.client_key = Some(key.into());
        self
    }

    pub fn merchant_id(mut self, id: impl Into<String>) -> Self {
        self.merchant_id = Some(id.into());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment.as_str().to_string());
        self
    }

    pub fn production(self) -> Self {
        self.environment(Environment::Production)
    }

    pub fn sandbox(self) -> Self {
        self.environment(Environment::Sandbox)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn snap_mode(mut self, enabled: bool) -> Self {
        self.snap_mode = Some(enabled);
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.log_enabled = Some(enabled);
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Applies a TOML document as explicit options
    pub fn merge_toml(mut self, document: &str) -> PaymentResult<Self> {
        let file: FileConfig = toml::from_str(document).map_err(|e| {
            invalid(FieldError::new(
                "File",
                e.message().to_string(),
                ErrorKind::InvalidParameter,
            ))
        })?;

        if let Some(v) = file.provider {
            self.provider = Some(v);
        }
        if let Some(v) = file.server_key {
            self.server_key = Some(v);
        }
        if let Some(v) = file.client_key {
            self.client_key = Some(v);
        }
        if let Some(v) = file.merchant_id {
            self.merchant_id = Some(v);
        }
        if let Some(v) = file.environment {
            self.environment = Some(v);
        }
        if let Some(v) = file.timeout_secs {
            self.timeout = Some(Duration::from_secs(v));
        }
        if let Some(v) = file.snap_mode {
            self.snap_mode = Some(v);
        }
        if let Some(v) = file.log_enabled {
            self.log_enabled = Some(v);
        }
        if let Some(v) = file.api_base_url {
            self.api_base_url = Some(v);
        }
        Ok(self)
    }

    pub fn build(self) -> PaymentResult<Config> {
        let mut provider = String::new();
        let mut cfg = ProviderConfig::default();
        let mut environment: Option<String> = None;

        // environment layer: only fills what is still empty
        overlay(&mut provider, self.env.get(ENV_PROVIDER));
        overlay(&mut cfg.server_key, self.env.get(ENV_SERVER_KEY));
        overlay(&mut cfg.client_key, self.env.get(ENV_CLIENT_KEY));
        overlay(&mut cfg.merchant_id, self.env.get(ENV_MERCHANT_ID));
        if let Some(v) = self.env.get(ENV_ENVIRONMENT) {
            environment = Some(v);
        }

        // explicit layer
        if let Some(v) = self.provider {
            provider = v;
        }
        if let Some(v) = self.server_key {
            cfg.server_key = v;
        }
        if let Some(v) = self.client_key {
            cfg.client_key = v;
        }
        if let Some(v) = self.merchant_id {
            cfg.merchant_id = v;
        }
        if let Some(v) = self.environment {
            environment = Some(v);
        }
        if let Some(v) = self.timeout {
            cfg.timeout = v;
        }
        if let Some(v) = self.snap_mode {
            cfg.snap_mode = v;
        }
        if let Some(v) = self.log_enabled {
            cfg.log_enabled = v;
        }
        if self.api_base_url.is_some() {
            cfg.api_base_url = self.api_base_url;
        }

        let provider = provider.trim().to_ascii_lowercase();
        if provider.is_empty() {
            return Err(invalid(FieldError::new(
                "Provider",
                "is required",
                ErrorKind::MissingParameter,
            )));
        }
        if cfg.server_key.trim().is_empty() {
            return Err(invalid(FieldError::new(
                "ServerKey",
                "is required",
                ErrorKind::MissingCredentials,
            )));
        }
        if let Some(raw) = environment {
            cfg.environment = raw.parse().map_err(|_| {
                invalid(FieldError::new(
                    "Environment",
                    format!("must be sandbox or production, got {:?}", raw),
                    ErrorKind::InvalidParameter,
                ))
            })?;
        }
        if cfg.timeout.is_zero() {
            return Err(invalid(FieldError::new(
                "Timeout",
                "must be greater than zero",
                ErrorKind::InvalidParameter,
            )));
        }
        validate_credentials(&provider, &cfg).map_err(invalid)?;

        Ok(Config {
            provider,
            provider_config: cfg,
        })
    }
}

fn overlay(field: &mut String, value: Option<String>) {
    if field.is_empty() {
        if let Some(v) = value {
            *field = v;
        }
    }
}

fn invalid(error: FieldError) -> PaymentError {
    PaymentError::InvalidConfiguration(ValidationError::from(error))
}

/// Shape check of credentials for `(provider, environment)`. Pure; no I/O.
pub fn validate_credentials(provider: &str, cfg: &ProviderConfig) -> Result<(), FieldError> {
    match provider {
        "midtrans" => {
            let is_sandbox_key = cfg
                .server_key
                .split('-')
                .next()
                .map(|prefix| prefix.eq_ignore_ascii_case("sb"))
                .unwrap_or(false);
            match (cfg.environment, is_sandbox_key) {
                (Environment::Sandbox, false) => Err(FieldError::new(
                    "ServerKey",
                    "sandbox server key must start with SB-",
                    ErrorKind::InvalidCredentials,
                )),
                (Environment::Production, true) => Err(FieldError::new(
                    "ServerKey",
                    "sandbox server key used in production",
                    ErrorKind::InvalidCredentials,
                )),
                _ => Ok(()),
            }
        }
        "xendit" => {
            let key = cfg.server_key.to_ascii_lowercase();
            let marker = match cfg.environment {
                Environment::Sandbox => "xnd_development_",
                Environment::Production => "xnd_production_",
            };
            if key.contains(marker) {
                Ok(())
            } else {
                Err(FieldError::new(
                    "ServerKey",
                    format!("{} key must contain {}", cfg.environment, marker),
                    ErrorKind::InvalidCredentials,
                ))
            }
        }
        "doku" => {
            if cfg.client_key.trim().is_empty() {
                Err(FieldError::new(
                    "ClientKey",
                    "is required for doku",
                    ErrorKind::MissingCredentials,
                ))
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::Map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::builder()
            .without_env()
            .provider("midtrans")
            .server_key("SB-Mid-server-XYZ")
            .build()
            .unwrap();

        assert_eq!(cfg.environment(), Environment::Sandbox);
        assert_eq!(cfg.timeout(), DEFAULT_TIMEOUT);
        assert!(!cfg.provider_config.log_enabled);
        assert!(!cfg.provider_config.snap_mode);
    }

    #[test]
    fn test_environment_overlay_fills_empty_fields() {
        let cfg = Config::builder()
            .env_source(env(&[
                (ENV_PROVIDER, "xendit"),
                (ENV_SERVER_KEY, "xnd_production_abc"),
                (ENV_ENVIRONMENT, "production"),
                (ENV_MERCHANT_ID, "M-1"),
            ]))
            .build()
            .unwrap();

        assert_eq!(cfg.provider, "xendit");
        assert_eq!(cfg.environment(), Environment::Production);
        assert_eq!(cfg.provider_config.merchant_id, "M-1");
    }

    #[test]
    fn test_explicit_options_override_environment() {
        let cfg = Config::builder()
            .env_source(env(&[(ENV_PROVIDER, "xendit"), (ENV_SERVER_KEY, "xnd_development_a")]))
            .provider("midtrans")
            .server_key("SB-Mid-server-1")
            .server_key("SB-Mid-server-2")
            .build()
            .unwrap();

        assert_eq!(cfg.provider, "midtrans");
        assert_eq!(cfg.server_key(), "SB-Mid-server-2");
    }

    #[test]
    fn test_missing_provider() {
        let err = Config::builder().without_env().server_key("k").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(err.is(ErrorKind::MissingParameter));
        assert_eq!(err.to_string(), "invalid configuration: Provider: is required");
    }

    #[test]
    fn test_missing_server_key() {
        let err = Config::builder().without_env().provider("midtrans").build().unwrap_err();
        assert!(err.is(ErrorKind::MissingCredentials));
    }

    #[test]
    fn test_bad_environment_value() {
        let err = Config::builder()
            .env_source(env(&[(ENV_ENVIRONMENT, "staging")]))
            .provider("midtrans")
            .server_key("SB-Mid-server-1")
            .build()
            .unwrap_err();
        assert!(err.is(ErrorKind::InvalidParameter));
    }

    #[test]
    fn test_sandbox_key_in_production_rejected() {
        let err = Config::builder()
            .without_env()
            .provider("midtrans")
            .production()
            .server_key("SB-Mid-server-XYZ")
            .build()
            .unwrap_err();
        assert!(err.is(ErrorKind::InvalidCredentials));
    }

    #[test]
    fn test_midtrans_prefix_is_case_insensitive() {
        assert!(Config::builder()
            .without_env()
            .provider("midtrans")
            .server_key("sb-mid-server-abc")
            .build()
            .is_ok());
        assert!(Config::builder()
            .without_env()
            .provider("midtrans")
            .production()
            .server_key("Mid-server-abc")
            .build()
            .is_ok());
    }

    #[test]
    fn test_xendit_credentials() {
        let cfg = ProviderConfig::new(Environment::Sandbox, "XND_DEVELOPMENT_abc");
        assert!(validate_credentials("xendit", &cfg).is_ok());
        let cfg = ProviderConfig::new(Environment::Production, "xnd_development_abc");
        assert_eq!(
            validate_credentials("xendit", &cfg).unwrap_err().kind,
            ErrorKind::InvalidCredentials
        );
    }

    #[test]
    fn test_doku_requires_client_key() {
        let cfg = ProviderConfig::new(Environment::Sandbox, "SK");
        assert_eq!(
            validate_credentials("doku", &cfg).unwrap_err().kind,
            ErrorKind::MissingCredentials
        );
        assert!(validate_credentials("doku", &cfg.with_client_key("CID")).is_ok());
    }

    #[test]
    fn test_merge_toml() {
        let cfg = Config::builder()
            .without_env()
            .merge_toml(
                r#"
                provider = "doku"
                server_key = "SK"
                client_key = "CID"
                environment = "production"
                timeout_secs = 10
                log_enabled = true
                "#,
            )
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(cfg.provider, "doku");
        assert_eq!(cfg.environment(), Environment::Production);
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert!(cfg.provider_config.log_enabled);
    }

    #[test]
    fn test_merge_toml_rejects_unknown_keys() {
        let err = Config::builder().merge_toml("bogus = 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let cfg = ProviderConfig::new(Environment::Sandbox, "SB-secret");
        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("SB-secret"));
    }
}
