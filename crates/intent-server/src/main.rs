//! intent-backend HTTP Server
//!
//! Axum-based server that creates Stripe payment intents for a front-end
//! and acknowledges Stripe webhooks.

mod app;
mod config;
mod cors;
mod handlers;
mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    if config.stripe_secret_key.is_some() {
        tracing::info!("✓ Stripe configured");
    } else {
        tracing::warn!("⚠ Stripe not configured - payment intents will fail");
        tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
    }

    match (&config.webhook_secret, config.require_signed_webhooks) {
        (Some(_), _) => tracing::info!("✓ Webhook signature verification enabled"),
        (None, true) => tracing::warn!("⚠ STRIPE_WEBHOOK_SECRET not set - all webhooks will be rejected"),
        (None, false) => {
            tracing::warn!("⚠ STRIPE_WEBHOOK_SECRET not set - webhooks are parsed WITHOUT verification");
            tracing::warn!("  Not recommended outside local development");
        }
    }

    if config.allowed_origins.is_empty() {
        tracing::info!("CORS: all origins allowed");
    } else {
        tracing::info!(origins = ?config.allowed_origins.origins(), "CORS: allow-list active");
    }

    let app = app::router(AppState::from_config(&config));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 intent-server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                      - Health check");
    tracing::info!("  POST /create-payment-intent - Create payment intent");
    tracing::info!("  POST /webhook               - Stripe webhook");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
