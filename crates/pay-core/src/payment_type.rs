//! # Payment Methods, Statuses and Environments
//!
//! Closed enums shared by every driver. Routing inside a driver is an
//! exhaustive `match` over [`PaymentClass`] or [`PaymentType`].

use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Method class used for routing and minimum-amount checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentClass {
    EWallet,
    VirtualAccount,
    Qris,
    CreditCard,
    Retail,
}

impl PaymentClass {
    /// Smallest accepted amount (IDR, smallest unit)
    pub fn min_amount(&self) -> i64 {
        match self {
            PaymentClass::EWallet => 100,
            PaymentClass::VirtualAccount => 10_000,
            PaymentClass::Qris => 1_500,
            PaymentClass::CreditCard => 10_000,
            PaymentClass::Retail => 10_000,
        }
    }
}

/// Payment method requested by the merchant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[serde(rename = "gopay")]
    GoPay,
    Ovo,
    Dana,
    #[serde(rename = "shopeepay")]
    ShopeePay,
    #[serde(rename = "linkaja")]
    LinkAja,
    #[serde(rename = "bca_va")]
    VaBca,
    #[serde(rename = "bni_va")]
    VaBni,
    #[serde(rename = "bri_va")]
    VaBri,
    #[serde(rename = "mandiri_va")]
    VaMandiri,
    #[serde(rename = "permata_va")]
    VaPermata,
    #[serde(rename = "cimb_va")]
    VaCimb,
    Qris,
    CreditCard,
    Alfamart,
    Indomaret,
}

impl PaymentType {
    pub const ALL: [PaymentType; 15] = [
        PaymentType::GoPay,
        PaymentType::Ovo,
        PaymentType::Dana,
        PaymentType::ShopeePay,
        PaymentType::LinkAja,
        PaymentType::VaBca,
        PaymentType::VaBni,
        PaymentType::VaBri,
        PaymentType::VaMandiri,
        PaymentType::VaPermata,
        PaymentType::VaCimb,
        PaymentType::Qris,
        PaymentType::CreditCard,
        PaymentType::Alfamart,
        PaymentType::Indomaret,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::GoPay => "gopay",
            PaymentType::Ovo => "ovo",
            PaymentType::Dana => "dana",
            PaymentType::ShopeePay => "shopeepay",
            PaymentType::LinkAja => "linkaja",
            PaymentType::VaBca => "bca_va",
            PaymentType::VaBni => "bni_va",
            PaymentType::VaBri => "bri_va",
            PaymentType::VaMandiri => "mandiri_va",
            PaymentType::VaPermata => "permata_va",
            PaymentType::VaCimb => "cimb_va",
            PaymentType::Qris => "qris",
            PaymentType::CreditCard => "credit_card",
            PaymentType::Alfamart => "alfamart",
            PaymentType::Indomaret => "indomaret",
        }
    }

    pub fn class(&self) -> PaymentClass {
        match self {
            PaymentType::GoPay
            | PaymentType::Ovo
            | PaymentType::Dana
            | PaymentType::ShopeePay
            | PaymentType::LinkAja => PaymentClass::EWallet,
            PaymentType::VaBca
            | PaymentType::VaBni
            | PaymentType::VaBri
            | PaymentType::VaMandiri
            | PaymentType::VaPermata
            | PaymentType::VaCimb => PaymentClass::VirtualAccount,
            PaymentType::Qris => PaymentClass::Qris,
            PaymentType::CreditCard => PaymentClass::CreditCard,
            PaymentType::Alfamart | PaymentType::Indomaret => PaymentClass::Retail,
        }
    }

    pub fn is_ewallet(&self) -> bool {
        self.class() == PaymentClass::EWallet
    }

    pub fn is_va(&self) -> bool {
        self.class() == PaymentClass::VirtualAccount
    }

    pub fn is_qris(&self) -> bool {
        self.class() == PaymentClass::Qris
    }

    pub fn is_cc(&self) -> bool {
        self.class() == PaymentClass::CreditCard
    }

    pub fn is_retail(&self) -> bool {
        self.class() == PaymentClass::Retail
    }

    /// Lowercase bank code for virtual accounts (`bca`, `mandiri`, ...)
    pub fn bank_code(&self) -> Option<&'static str> {
        match self {
            PaymentType::VaBca => Some("bca"),
            PaymentType::VaBni => Some("bni"),
            PaymentType::VaBri => Some("bri"),
            PaymentType::VaMandiri => Some("mandiri"),
            PaymentType::VaPermata => Some("permata"),
            PaymentType::VaCimb => Some("cimb"),
            _ => None,
        }
    }

    pub fn min_amount(&self) -> i64 {
        self.class().min_amount()
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        PaymentType::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| PaymentError::InvalidParameter(format!("unknown payment type: {}", s)))
    }
}

/// Unified transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pending,
    Processing,
    Success,
    Failed,
    Cancelled,
    Expired,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::Processing => "PROCESSING",
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
            Status::Cancelled => "CANCELLED",
            Status::Expired => "EXPIRED",
        }
    }

    /// Terminal states; once observed they never change
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Status::Success | Status::Failed | Status::Cancelled | Status::Expired
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Pending
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Sandbox
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            other => Err(PaymentError::InvalidParameter(format!(
                "environment must be sandbox or production, got {:?}",
                other
            ))),
        }
    }
}
