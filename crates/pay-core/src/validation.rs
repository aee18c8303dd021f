//! # Request Validation
//!
//! Field validators run by every driver before any network I/O.
//! Validators stop at the first failure and return a [`FieldError`];
//! [`collect_charge_params`] gathers all failures instead.

use crate::error::{ErrorKind, FieldError, ValidationError};
use crate::model::{ChargeParams, Customer, Item};
use crate::payment_type::PaymentType;
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_ORDER_ID_LEN: usize = 100;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("email regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?(62|63)[0-9]{9,13}$").expect("phone regex"));

/// What a given driver accepts
#[derive(Debug, Clone, Copy)]
pub struct ValidationRules<'a> {
    pub supported: &'a [PaymentType],
    pub require_items: bool,
    pub require_phone: bool,
}

impl<'a> ValidationRules<'a> {
    pub fn new(supported: &'a [PaymentType]) -> Self {
        Self {
            supported,
            require_items: false,
            require_phone: false,
        }
    }

    pub fn require_items(mut self, required: bool) -> Self {
        self.require_items = required;
        self
    }

    pub fn require_phone(mut self, required: bool) -> Self {
        self.require_phone = required;
        self
    }
}

pub fn validate_order_id(order_id: &str) -> Result<(), FieldError> {
    if order_id.trim().is_empty() {
        return Err(FieldError::new("OrderID", "is required", ErrorKind::MissingParameter));
    }
    if order_id.chars().count() > MAX_ORDER_ID_LEN {
        return Err(FieldError::new(
            "OrderID",
            format!("must be at most {} characters", MAX_ORDER_ID_LEN),
            ErrorKind::InvalidParameter,
        ));
    }
    Ok(())
}

pub fn validate_amount(amount: i64, payment_type: PaymentType) -> Result<(), FieldError> {
    let minimum = payment_type.min_amount();
    if amount < minimum {
        return Err(FieldError::new(
            "Amount",
            format!("must be at least {} for {}", minimum, payment_type),
            ErrorKind::MinAmount,
        ));
    }
    Ok(())
}

pub fn validate_customer_id(id: &str) -> Result<(), FieldError> {
    if id.trim().is_empty() {
        return Err(FieldError::new(
            "Customer.ID",
            "is required",
            ErrorKind::MissingParameter,
        ));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if !is_valid_email(email) {
        return Err(FieldError::new(
            "Customer.Email",
            "must be a valid email address",
            ErrorKind::InvalidParameter,
        ));
    }
    Ok(())
}

/// Normalise an Indonesian/Philippine number to `+62...` / `+63...`.
///
/// Separators are dropped and a national leading `0` becomes `62`.
pub fn normalize_phone(phone: &str) -> Result<String, FieldError> {
    let mut digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    if let Some(rest) = digits.strip_prefix('+') {
        digits = rest.to_string();
    }
    if let Some(rest) = digits.strip_prefix('0') {
        digits = format!("62{}", rest);
    }
    let candidate = format!("+{}", digits);
    if PHONE_RE.is_match(&candidate) {
        Ok(candidate)
    } else {
        Err(FieldError::new(
            "Customer.Phone",
            "must be an Indonesian (+62) or Philippine (+63) number",
            ErrorKind::InvalidPhoneNumber,
        ))
    }
}

pub fn validate_phone(phone: &str) -> Result<(), FieldError> {
    normalize_phone(phone).map(|_| ())
}

pub fn validate_payment_type(
    payment_type: PaymentType,
    supported: &[PaymentType],
) -> Result<(), FieldError> {
    if !supported.contains(&payment_type) {
        return Err(FieldError::new(
            "PaymentType",
            format!("{} is not supported", payment_type),
            ErrorKind::InvalidParameter,
        ));
    }
    Ok(())
}

pub fn validate_items(items: &[Item], required: bool) -> Result<(), FieldError> {
    if required && items.is_empty() {
        return Err(FieldError::new("Items", "is required", ErrorKind::MissingParameter));
    }
    for (i, item) in items.iter().enumerate() {
        if item.price < 0 {
            return Err(FieldError::new(
                format!("Items[{}].Price", i),
                "must not be negative",
                ErrorKind::InvalidParameter,
            ));
        }
        if item.quantity < 1 {
            return Err(FieldError::new(
                format!("Items[{}].Quantity", i),
                "must be at least 1",
                ErrorKind::InvalidParameter,
            ));
        }
    }
    Ok(())
}

fn validate_customer(customer: &Customer, require_phone: bool) -> Result<(), FieldError> {
    validate_customer_id(&customer.id)?;
    validate_email(&customer.email)?;
    if require_phone || !customer.phone.is_empty() {
        validate_phone(&customer.phone)?;
    }
    Ok(())
}

/// Validates in fixed order and stops at the first failure.
pub fn validate_charge_params(
    params: &ChargeParams,
    rules: &ValidationRules<'_>,
) -> Result<(), FieldError> {
    validate_order_id(&params.order_id)?;
    validate_amount(params.amount, params.payment_type)?;
    validate_customer(&params.customer, rules.require_phone)?;
    validate_payment_type(params.payment_type, rules.supported)?;
    validate_items(&params.items, rules.require_items)?;
    Ok(())
}

/// Same checks as [`validate_charge_params`], gathering every failure.
pub fn collect_charge_params(
    params: &ChargeParams,
    rules: &ValidationRules<'_>,
) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();
    let checks = [
        validate_order_id(&params.order_id),
        validate_amount(params.amount, params.payment_type),
        validate_customer_id(&params.customer.id),
        validate_email(&params.customer.email),
        if rules.require_phone || !params.customer.phone.is_empty() {
            validate_phone(&params.customer.phone)
        } else {
            Ok(())
        },
        validate_payment_type(params.payment_type, rules.supported),
        validate_items(&params.items, rules.require_items),
    ];
    for check in checks {
        if let Err(e) = check {
            errors.add(e);
        }
    }
    if errors.has_errors() {
        Err(errors)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(payment_type: PaymentType, amount: i64) -> ChargeParams {
        ChargeParams::new(
            "ORDER-1",
            amount,
            payment_type,
            Customer::new("CUST-1", "Jane", "a@b.co", "+628123456789"),
        )
    }

    #[test]
    fn test_order_id_length() {
        assert!(validate_order_id("A").is_ok());
        assert!(validate_order_id(&"A".repeat(100)).is_ok());
        let err = validate_order_id(&"A".repeat(101)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParameter);
        assert_eq!(validate_order_id("").unwrap_err().kind, ErrorKind::MissingParameter);
    }

    #[test]
    fn test_min_amount_rejection() {
        let err = validate_charge_params(
            &params(PaymentType::VaBca, 1),
            &ValidationRules::new(&PaymentType::ALL),
        )
        .unwrap_err();
        assert_eq!(err.field, "Amount");
        assert_eq!(err.kind(), ErrorKind::MinAmount);
    }

    #[test]
    fn test_email_regex() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@sub.example.id"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("not an email"));
    }

    #[test]
    fn test_phone_normalisation() {
        assert_eq!(normalize_phone("08123456789").unwrap(), "+628123456789");
        assert_eq!(normalize_phone("+62 812-3456-789").unwrap(), "+628123456789");
        assert_eq!(normalize_phone("639171234567").unwrap(), "+639171234567");
        let err = normalize_phone("+1 415 555 0100").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPhoneNumber);
        assert!(normalize_phone("+62123").is_err());
    }

    #[test]
    fn test_unsupported_payment_type() {
        let rules = ValidationRules::new(&[PaymentType::GoPay]);
        let err = validate_charge_params(&params(PaymentType::Qris, 5_000), &rules).unwrap_err();
        assert_eq!(err.field, "PaymentType");
    }

    #[test]
    fn test_items_required() {
        let rules = ValidationRules::new(&PaymentType::ALL).require_items(true);
        let err = validate_charge_params(&params(PaymentType::GoPay, 5_000), &rules).unwrap_err();
        assert_eq!(err.field, "Items");
        assert_eq!(err.kind, ErrorKind::MissingParameter);
    }

    #[test]
    fn test_first_failure_wins() {
        let mut p = params(PaymentType::VaBca, 1);
        p.order_id.clear();
        let err = validate_charge_params(&p, &ValidationRules::new(&PaymentType::ALL)).unwrap_err();
        assert_eq!(err.field, "OrderID");
    }

    #[test]
    fn test_collect_gathers_everything() {
        let mut p = params(PaymentType::VaBca, 1);
        p.order_id.clear();
        p.customer.email = "nope".into();
        let errs = collect_charge_params(&p, &ValidationRules::new(&PaymentType::ALL)).unwrap_err();
        assert_eq!(errs.errors.len(), 3);
        assert_eq!(errs.to_string(), "validation failed: 3 errors");
    }
}
