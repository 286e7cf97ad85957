//! Server Configuration
//!
//! Read once at startup from the environment (and `.env`, via `dotenvy`).

use anyhow::{Context, Result};

use crate::cors::OriginAllowList;

pub const DEFAULT_PORT: u16 = 8787;

/// Immutable process configuration
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Listen port
    pub port: u16,

    /// Stripe API key; payment intents fail without it
    pub stripe_secret_key: Option<String>,

    /// Webhook signing secret; enables signature verification
    pub webhook_secret: Option<String>,

    /// Reject webhooks outright when no signing secret is configured
    pub require_signed_webhooks: bool,

    /// CORS allow-list (empty = allow all)
    pub allowed_origins: OriginAllowList,
}

impl Config {
    /// Load from process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup`; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {port:?}"))?,
            None => DEFAULT_PORT,
        };

        let require_signed_webhooks = match get("WEBHOOK_REQUIRE_SIGNATURE") {
            Some(flag) => parse_bool(&flag)
                .with_context(|| format!("WEBHOOK_REQUIRE_SIGNATURE must be true or false, got {flag:?}"))?,
            None => false,
        };

        Ok(Self {
            port,
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            webhook_secret: get("STRIPE_WEBHOOK_SECRET"),
            require_signed_webhooks,
            allowed_origins: OriginAllowList::parse(get("ALLOWED_ORIGINS").as_deref().unwrap_or("")),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
