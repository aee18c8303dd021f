//! # paygate-webhooks
//!
//! Standalone webhook receiver for one configured gateway.
//!
//! ```bash
//! export PG_PROVIDER=midtrans
//! export PG_SERVER_KEY=SB-Mid-server-...
//! export PG_ENVIRONMENT=sandbox
//!
//! # optional
//! export HOST=0.0.0.0 PORT=8080 LOG_FORMAT=json
//!
//! paygate-webhooks
//! ```

use anyhow::Context as _;
use pay_client::{init_tracing, serve, webhook_router, Client, LogFormat, LoggingWebhookHandler};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let format = std::env::var("LOG_FORMAT")
        .unwrap_or_default()
        .parse::<LogFormat>()
        .map_err(anyhow::Error::msg)?;
    init_tracing(format);

    let client = Client::from_env().context("failed to configure payment client")?;
    let addr = socket_addr()?;

    info!(
        provider = client.provider_name(),
        "webhook endpoint: POST http://{}/webhook/{}",
        addr,
        client.provider_name()
    );

    let router = webhook_router(Arc::new(client), Arc::new(LoggingWebhookHandler));
    serve(addr, router).await
}

fn socket_addr() -> anyhow::Result<SocketAddr> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))
}
