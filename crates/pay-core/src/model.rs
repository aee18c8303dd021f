//! # Unified Data Model
//!
//! Request and response shapes shared by every gateway driver.
//! Amounts are `i64` in the smallest currency unit (IDR has no minor unit).

use crate::payment_type::{PaymentType, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Paying customer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl Customer {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// A purchased line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: i64, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            category: None,
            url: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

/// Unified charge request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeParams {
    pub order_id: String,
    pub amount: i64,
    pub payment_type: PaymentType,
    pub customer: Customer,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    /// Driver-specific extras (checkout method, tokens, acquirer, ...)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom: HashMap<String, Value>,
}

impl ChargeParams {
    pub fn new(
        order_id: impl Into<String>,
        amount: i64,
        payment_type: PaymentType,
        customer: Customer,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            amount,
            payment_type,
            customer,
            items: Vec::new(),
            description: None,
            expiry_time: None,
            callback_url: None,
            return_url: None,
            custom: HashMap::new(),
        }
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_expiry_time(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry_time = Some(expiry);
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    /// String value from `custom`, if present
    pub fn custom_str(&self, key: &str) -> Option<&str> {
        self.custom.get(key).and_then(Value::as_str)
    }
}

/// Result of a charge request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeResponse {
    pub transaction_id: String,
    pub order_id: String,
    pub amount: i64,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub va_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub va_bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Gateway response, untouched
    #[serde(default)]
    pub raw: Map<String, Value>,
}

impl ChargeResponse {
    pub fn new(transaction_id: impl Into<String>, order_id: impl Into<String>, amount: i64) -> Self {
        let now = Utc::now();
        Self {
            transaction_id: transaction_id.into(),
            order_id: order_id.into(),
            amount,
            status: Status::Pending,
            payment_url: None,
            qr_string: None,
            va_number: None,
            va_bank: None,
            expiry_time: None,
            created_at: now,
            updated_at: now,
            raw: Map::new(),
        }
    }
}

/// Snapshot of a transaction's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub transaction_id: String,
    pub order_id: String,
    pub status: Status,
    pub amount: i64,
    pub paid_amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub raw: Map<String, Value>,
}

impl PaymentStatus {
    pub fn new(
        transaction_id: impl Into<String>,
        order_id: impl Into<String>,
        status: Status,
        amount: i64,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            order_id: order_id.into(),
            status,
            amount,
            paid_amount: 0,
            payment_type: None,
            paid_at: None,
            cancelled_at: None,
            expired_at: None,
            failure_reason: None,
            raw: Map::new(),
        }
    }

    /// Records the payment time; ignored unless the status is SUCCESS
    pub fn with_paid_at(mut self, paid_at: Option<DateTime<Utc>>) -> Self {
        if self.status.is_success() {
            self.paid_at = paid_at;
        }
        self
    }
}

/// Normalised webhook event tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "payment.completed")]
    PaymentCompleted,
    #[serde(rename = "payment.failed")]
    PaymentFailed,
    #[serde(rename = "payment.pending")]
    PaymentPending,
    #[serde(rename = "payment.expired")]
    PaymentExpired,
    #[serde(rename = "payment.cancelled")]
    PaymentCancelled,
}

impl WebhookEventType {
    pub fn from_status(status: Status) -> Self {
        match status {
            Status::Success => WebhookEventType::PaymentCompleted,
            Status::Failed => WebhookEventType::PaymentFailed,
            Status::Pending | Status::Processing => WebhookEventType::PaymentPending,
            Status::Expired => WebhookEventType::PaymentExpired,
            Status::Cancelled => WebhookEventType::PaymentCancelled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEventType::PaymentCompleted => "payment.completed",
            WebhookEventType::PaymentFailed => "payment.failed",
            WebhookEventType::PaymentPending => "payment.pending",
            WebhookEventType::PaymentExpired => "payment.expired",
            WebhookEventType::PaymentCancelled => "payment.cancelled",
        }
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified, parsed webhook notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub order_id: String,
    pub transaction_id: String,
    pub status: Status,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    pub event_type: WebhookEventType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub raw: Map<String, Value>,
}

impl WebhookEvent {
    /// Event with `event_type` derived from `status`
    pub fn new(
        order_id: impl Into<String>,
        transaction_id: impl Into<String>,
        status: Status,
        amount: i64,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            transaction_id: transaction_id.into(),
            status,
            amount,
            payment_type: None,
            event_type: WebhookEventType::from_status(status),
            timestamp: Utc::now(),
            fraud_status: None,
            raw: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn customer() -> Customer {
        Customer::new("CUST-1", "Jane Doe", "jane@example.com", "+628123456789")
    }

    #[test]
    fn test_item_total() {
        let item = Item::new("I1", "Kopi", 25_000, 3);
        assert_eq!(item.total(), 75_000);
    }

    #[test]
    fn test_charge_params_builder() {
        let params = ChargeParams::new("ORDER-1", 50_000, PaymentType::GoPay, customer())
            .with_item(Item::new("I1", "Kopi", 50_000, 1))
            .with_callback_url("https://cb")
            .with_expiry_time(Utc::now() + Duration::hours(1))
            .with_custom("acquirer", "gopay");

        assert_eq!(params.items.len(), 1);
        assert_eq!(params.callback_url.as_deref(), Some("https://cb"));
        assert_eq!(params.custom_str("acquirer"), Some("gopay"));
        assert_eq!(params.custom_str("missing"), None);
    }

    #[test]
    fn test_paid_at_requires_success() {
        let now = Some(Utc::now());
        let pending = PaymentStatus::new("T1", "O1", Status::Pending, 1000).with_paid_at(now);
        assert!(pending.paid_at.is_none());

        let paid = PaymentStatus::new("T1", "O1", Status::Success, 1000).with_paid_at(now);
        assert!(paid.paid_at.is_some());
    }

    #[test]
    fn test_webhook_event_type_from_status() {
        assert_eq!(
            WebhookEvent::new("O1", "T1", Status::Success, 1).event_type.as_str(),
            "payment.completed"
        );
        assert_eq!(
            WebhookEventType::from_status(Status::Processing),
            WebhookEventType::PaymentPending
        );
        let json = serde_json::to_string(&WebhookEventType::PaymentExpired).unwrap();
        assert_eq!(json, "\"payment.expired\"");
    }
}
