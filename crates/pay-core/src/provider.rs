//! # Provider Trait
//!
//! One implementation per gateway. The client facade holds a single boxed
//! provider and forwards every call to it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Provider (trait)                       │
//! │  ├── create_charge()    ├── verify_webhook()                │
//! │  ├── get_status()       ├── parse_webhook()                 │
//! │  ├── cancel()           └── name()                          │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┼─────────────────┐
//!          │                 │                 │
//!  ┌───────┴───────┐ ┌───────┴───────┐ ┌───────┴───────┐
//!  │   Midtrans    │ │    Xendit     │ │     Doku      │
//!  │   Provider    │ │   Provider    │ │   Provider    │
//!  └───────────────┘ └───────────────┘ └───────────────┘
//! ```
//!
//! Every driver runs the same pipeline inside `create_charge`: validate,
//! pick endpoint and auth for the environment and method class, map to the
//! wire request, sign, dispatch, parse, map back.

use crate::context::Context;
use crate::error::PaymentResult;
use crate::model::{ChargeParams, ChargeResponse, PaymentStatus, WebhookEvent};
use crate::webhook::WebhookRequest;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable lowercase identifier (`midtrans`, `xendit`, `doku`)
    fn name(&self) -> &'static str;

    /// Start a payment. Validation happens before any network I/O.
    async fn create_charge(
        &self,
        ctx: &Context,
        params: &ChargeParams,
    ) -> PaymentResult<ChargeResponse>;

    async fn get_status(&self, ctx: &Context, order_id: &str) -> PaymentResult<PaymentStatus>;

    async fn cancel(&self, ctx: &Context, order_id: &str) -> PaymentResult<()>;

    /// Signature check over the buffered request
    fn verify_webhook(&self, request: &WebhookRequest) -> bool;

    /// Parse without verifying; callers gate on [`verify_webhook`](Self::verify_webhook)
    fn parse_webhook(&self, request: &WebhookRequest) -> PaymentResult<WebhookEvent>;
}

/// Type alias for a shared provider (dynamic dispatch)
pub type BoxedProvider = Arc<dyn Provider>;
