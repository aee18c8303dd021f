//! # Payment Error Types
//!
//! Typed error handling for every gateway driver.
//! All payment operations return `Result<T, PaymentError>`.
//!
//! Three composite shapes sit on top of the plain kinds:
//!
//! - [`FieldError`] names the offending field and carries an inner [`ErrorKind`]
//! - [`ValidationError`] aggregates several field errors
//! - [`ProviderError`] wraps a gateway's own error payload

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Tag for every error the library can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unimplemented,
    MissingParameter,
    InvalidParameter,
    MissingCredentials,
    InvalidCredentials,
    MinAmount,
    InvalidPhoneNumber,
    InvalidSignature,
    InvalidPayload,
    DuplicateTransaction,
    TransactionNotFound,
    TransactionFailed,
    Timeout,
    RateLimit,
    ServiceUnavailable,
    NetworkError,
    WebhookVerificationFailed,
    InvalidWebhookType,
    UnsupportedProvider,
    InvalidConfiguration,
    Validation,
    Provider,
}

impl ErrorKind {
    /// Default human readable message for the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unimplemented => "not implemented",
            ErrorKind::MissingParameter => "missing required parameter",
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::MissingCredentials => "missing credentials",
            ErrorKind::InvalidCredentials => "invalid credentials",
            ErrorKind::MinAmount => "amount is below the minimum",
            ErrorKind::InvalidPhoneNumber => "invalid phone number",
            ErrorKind::InvalidSignature => "invalid signature",
            ErrorKind::InvalidPayload => "invalid payload",
            ErrorKind::DuplicateTransaction => "duplicate transaction",
            ErrorKind::TransactionNotFound => "transaction not found",
            ErrorKind::TransactionFailed => "transaction failed",
            ErrorKind::Timeout => "request timed out",
            ErrorKind::RateLimit => "rate limit exceeded",
            ErrorKind::ServiceUnavailable => "service unavailable",
            ErrorKind::NetworkError => "network error",
            ErrorKind::WebhookVerificationFailed => "webhook verification failed",
            ErrorKind::InvalidWebhookType => "invalid webhook type",
            ErrorKind::UnsupportedProvider => "unsupported provider",
            ErrorKind::InvalidConfiguration => "invalid configuration",
            ErrorKind::Validation => "validation failed",
            ErrorKind::Provider => "provider error",
        }
    }

    /// Classify an HTTP (or provider-envelope) status code
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 | 403 => Some(ErrorKind::InvalidCredentials),
            404 => Some(ErrorKind::TransactionNotFound),
            409 => Some(ErrorKind::DuplicateTransaction),
            429 => Some(ErrorKind::RateLimit),
            502..=504 => Some(ErrorKind::ServiceUnavailable),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure tied to a single input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub kind: ErrorKind,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }

    /// The wrapped kind (what the field error unwraps to)
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{} is invalid", self.field)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl std::error::Error for FieldError {}

/// Aggregate of per-field failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `None` when nothing was collected
    pub fn into_error(self) -> Option<PaymentError> {
        if self.has_errors() {
            Some(PaymentError::Validation(self))
        } else {
            None
        }
    }

    pub fn into_result(self) -> PaymentResult<()> {
        match self.into_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// First collected error, if any
    pub fn first(&self) -> Option<&FieldError> {
        self.errors.first()
    }
}

impl From<FieldError> for ValidationError {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => f.write_str("validation failed"),
            [only] => write!(f, "{}", only),
            many => write!(f, "validation failed: {} errors", many.len()),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Error payload reported by a gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
    pub provider: String,
    pub code: String,
    pub message: String,
    pub raw: Option<Value>,
    pub kind: Option<ErrorKind>,
}

impl ProviderError {
    pub fn new(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let code = code.into();
        let kind = code.parse::<u16>().ok().and_then(ErrorKind::from_status);
        Self {
            provider: provider.into(),
            code,
            message: message.into(),
            raw: None,
            kind,
        }
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error [{}]: {}", self.provider, self.code, self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Operation the gateway does not offer
    #[error("not implemented: {0}")]
    Unimplemented(String),

    /// Required charge field left empty
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// Field present but malformed or out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Server or client key not configured
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// Key rejected by the gateway or wrong for the environment
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Amount under the per-method minimum
    #[error("amount {amount} is below the minimum of {minimum}")]
    MinAmount { amount: i64, minimum: i64 },

    /// Phone number that does not normalize to `+62`
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// Webhook signature did not match
    #[error("invalid signature")]
    InvalidSignature,

    /// Body could not be decoded into the expected shape
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Order id already used with this gateway
    #[error("duplicate transaction: {0}")]
    DuplicateTransaction(String),

    /// Unknown transaction or order id
    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    /// Gateway accepted the request but declined the payment
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Deadline exceeded or context cancelled
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Too many requests; retry later
    #[error("rate limited by {provider}")]
    RateLimit { provider: String },

    /// Gateway is down or overloaded
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Wire-level failure talking to the gateway
    #[error("network error: {0}")]
    NetworkError(String),

    /// Webhook could not be checked at all, e.g. missing headers
    #[error("webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Notification kind this crate does not handle
    #[error("invalid webhook type: {0}")]
    InvalidWebhookType(String),

    /// No driver registered under that name
    #[error("unsupported provider: {name}")]
    UnsupportedProvider { name: String },

    /// Config failed validation before any driver was built
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(ValidationError),

    /// Single field failure
    #[error(transparent)]
    Field(FieldError),

    /// Several field failures collected together
    #[error(transparent)]
    Validation(ValidationError),

    /// Error reported by the gateway itself
    #[error(transparent)]
    Provider(ProviderError),
}

impl PaymentError {
    /// Outer tag of the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::Unimplemented(_) => ErrorKind::Unimplemented,
            PaymentError::MissingParameter(_) => ErrorKind::MissingParameter,
            PaymentError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            PaymentError::MissingCredentials(_) => ErrorKind::MissingCredentials,
            PaymentError::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
            PaymentError::MinAmount { .. } => ErrorKind::MinAmount,
            PaymentError::InvalidPhoneNumber(_) => ErrorKind::InvalidPhoneNumber,
            PaymentError::InvalidSignature => ErrorKind::InvalidSignature,
            PaymentError::InvalidPayload(_) => ErrorKind::InvalidPayload,
            PaymentError::DuplicateTransaction(_) => ErrorKind::DuplicateTransaction,
            PaymentError::TransactionNotFound(_) => ErrorKind::TransactionNotFound,
            PaymentError::TransactionFailed(_) => ErrorKind::TransactionFailed,
            PaymentError::Timeout(_) => ErrorKind::Timeout,
            PaymentError::RateLimit { .. } => ErrorKind::RateLimit,
            PaymentError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            PaymentError::NetworkError(_) => ErrorKind::NetworkError,
            PaymentError::WebhookVerificationFailed(_) => ErrorKind::WebhookVerificationFailed,
            PaymentError::InvalidWebhookType(_) => ErrorKind::InvalidWebhookType,
            PaymentError::UnsupportedProvider { .. } => ErrorKind::UnsupportedProvider,
            PaymentError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            PaymentError::Field(err) => err.kind,
            PaymentError::Validation(_) => ErrorKind::Validation,
            PaymentError::Provider(_) => ErrorKind::Provider,
        }
    }

    /// True when this error, or anything it wraps, carries `kind`
    pub fn is(&self, kind: ErrorKind) -> bool {
        if self.kind() == kind {
            return true;
        }
        match self {
            PaymentError::InvalidConfiguration(inner) | PaymentError::Validation(inner) => {
                inner.errors.iter().any(|e| e.kind == kind)
            }
            PaymentError::Provider(inner) => inner.kind == Some(kind),
            _ => false,
        }
    }

    pub fn is_provider_error(&self) -> bool {
        matches!(self, PaymentError::Provider(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, PaymentError::Validation(_))
    }

    pub fn is_field_error(&self) -> bool {
        matches!(self, PaymentError::Field(_))
    }

    pub fn as_provider_error(&self) -> Option<&ProviderError> {
        match self {
            PaymentError::Provider(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_field_error(&self) -> Option<&FieldError> {
        match self {
            PaymentError::Field(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.is(ErrorKind::NetworkError)
            || self.is(ErrorKind::Timeout)
            || self.is(ErrorKind::RateLimit)
            || self.is(ErrorKind::ServiceUnavailable)
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Unimplemented => 501,
            ErrorKind::MissingParameter
            | ErrorKind::InvalidParameter
            | ErrorKind::MinAmount
            | ErrorKind::InvalidPhoneNumber
            | ErrorKind::InvalidPayload
            | ErrorKind::InvalidWebhookType
            | ErrorKind::Validation => 400,
            ErrorKind::MissingCredentials
            | ErrorKind::InvalidCredentials
            | ErrorKind::InvalidSignature
            | ErrorKind::WebhookVerificationFailed => 401,
            ErrorKind::TransactionNotFound | ErrorKind::UnsupportedProvider => 404,
            ErrorKind::DuplicateTransaction => 409,
            ErrorKind::TransactionFailed => 402,
            ErrorKind::Timeout => 504,
            ErrorKind::RateLimit => 429,
            ErrorKind::ServiceUnavailable | ErrorKind::NetworkError | ErrorKind::Provider => 502,
            ErrorKind::InvalidConfiguration => 500,
        }
    }
}

impl From<FieldError> for PaymentError {
    fn from(err: FieldError) -> Self {
        PaymentError::Field(err)
    }
}

impl From<ValidationError> for PaymentError {
    fn from(err: ValidationError) -> Self {
        PaymentError::Validation(err)
    }
}

impl From<ProviderError> for PaymentError {
    fn from(err: ProviderError) -> Self {
        PaymentError::Provider(err)
    }
}

pub fn is_provider_error(err: &PaymentError) -> bool {
    err.is_provider_error()
}

pub fn is_validation_error(err: &PaymentError) -> bool {
    err.is_validation_error()
}

pub fn is_field_error(err: &PaymentError) -> bool {
    err.is_field_error()
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
