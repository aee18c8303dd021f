//! # Webhook Receiver
//!
//! Axum surface that verifies gateway notifications with the client's driver
//! and hands the parsed event to a [`WebhookHandler`].

use crate::client::Client;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pay_core::{ErrorKind, PaymentError, PaymentResult, WebhookEvent, WebhookEventType, WebhookRequest};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// Handler
// =============================================================================

/// Application hooks per event type. Every hook logs by default.
pub trait WebhookHandler: Send + Sync {
    fn on_payment_completed(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(order_id = %event.order_id, amount = event.amount, "payment completed");
        Ok(())
    }

    fn on_payment_failed(&self, event: &WebhookEvent) -> PaymentResult<()> {
        warn!(order_id = %event.order_id, "payment failed");
        Ok(())
    }

    fn on_payment_pending(&self, event: &WebhookEvent) -> PaymentResult<()> {
        debug!(order_id = %event.order_id, "payment pending");
        Ok(())
    }

    fn on_payment_expired(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(order_id = %event.order_id, "payment expired");
        Ok(())
    }

    fn on_payment_cancelled(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(order_id = %event.order_id, "payment cancelled");
        Ok(())
    }
}

/// Handler that only logs
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

pub fn dispatch_webhook_event(handler: &dyn WebhookHandler, event: &WebhookEvent) -> PaymentResult<()> {
    match event.event_type {
        WebhookEventType::PaymentCompleted => handler.on_payment_completed(event),
        WebhookEventType::PaymentFailed => handler.on_payment_failed(event),
        WebhookEventType::PaymentPending => handler.on_payment_pending(event),
        WebhookEventType::PaymentExpired => handler.on_payment_expired(event),
        WebhookEventType::PaymentCancelled => handler.on_payment_cancelled(event),
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct WebhookAck {
    received: bool,
    order_id: String,
    event_type: WebhookEventType,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, err: &PaymentError) -> ApiError {
    (
        status,
        Json(ErrorResponse::new(err.to_string(), status.as_u16()).with_details(err.kind().as_str())),
    )
}

// =============================================================================
// Router
// =============================================================================

#[derive(Clone)]
struct WebhookState {
    client: Arc<Client>,
    handler: Arc<dyn WebhookHandler>,
}

/// Routes:
/// - `GET  /health`
/// - `POST /webhook/{provider}`
pub fn webhook_router(client: Arc<Client>, handler: Arc<dyn WebhookHandler>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/{provider}", post(receive_webhook))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(WebhookState { client, handler })
}

async fn health(State(state): State<WebhookState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "provider": state.client.provider_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
async fn receive_webhook(
    State(state): State<WebhookState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if !provider.eq_ignore_ascii_case(state.client.provider_name()) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("no webhook for provider: {}", provider), 404)),
        ));
    }

    let request = WebhookRequest::new(headers, body);
    let event = state.client.parse_webhook(&request).map_err(|e| {
        if e.is(ErrorKind::InvalidSignature) {
            warn!("rejected unsigned webhook");
            reject(StatusCode::UNAUTHORIZED, &e)
        } else {
            warn!("unreadable webhook: {}", e);
            reject(StatusCode::BAD_REQUEST, &e)
        }
    })?;

    info!(
        order_id = %event.order_id,
        event_type = %event.event_type,
        "received webhook"
    );

    dispatch_webhook_event(state.handler.as_ref(), &event).map_err(|e| {
        error!("webhook handler failed: {}", e);
        let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        reject(status, &e)
    })?;

    Ok(Json(WebhookAck {
        received: true,
        order_id: event.order_id,
        event_type: event.event_type,
    }))
}

/// Binds `addr` and serves until the listener fails
pub async fn serve(addr: SocketAddr, router: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("webhook receiver listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
