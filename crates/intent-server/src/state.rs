//! Application State

use std::sync::Arc;

use intent_payments::{PaymentProcessor, StripeProcessor, WebhookHandler};

use crate::config::Config;
use crate::cors::OriginAllowList;

/// Shared application state, read-only after startup
#[derive(Clone)]
pub struct AppState {
    /// Payment processor (None if STRIPE_SECRET_KEY is not set)
    pub processor: Option<Arc<dyn PaymentProcessor>>,

    /// Webhook verification and dispatch
    pub webhooks: Arc<WebhookHandler>,

    /// CORS allow-list
    pub origins: Arc<OriginAllowList>,
}

impl AppState {
    /// Build state backed by Stripe
    pub fn from_config(config: &Config) -> Self {
        let processor = config
            .stripe_secret_key
            .as_deref()
            .map(|key| Arc::new(StripeProcessor::new(key)) as Arc<dyn PaymentProcessor>);

        Self::with_processor(config, processor)
    }

    /// Build state around an arbitrary processor
    pub fn with_processor(config: &Config, processor: Option<Arc<dyn PaymentProcessor>>) -> Self {
        let webhooks = WebhookHandler::new(config.webhook_secret.clone())
            .require_signature(config.require_signed_webhooks);

        Self {
            processor,
            webhooks: Arc::new(webhooks),
            origins: Arc::new(config.allowed_origins.clone()),
        }
    }
}
