//! # intent-payments
//!
//! Payment-intent creation and webhook handling for intent-backend.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  amount, currency  ┌──────────────────┐  create   ┌──────────┐
//! │  Front-end  │───────────────────▶│  PaymentIntent   │──────────▶│  Stripe  │
//! │             │◀───────────────────│  Request         │◀──────────│          │
//! └─────────────┘    client secret   └──────────────────┘           └──────────┘
//!                                                                        │
//!                         ┌──────────────────┐   signed webhook          │
//!                         │  WebhookHandler  │◀──────────────────────────┘
//!                         └──────────────────┘
//! ```
//!
//! The front-end completes payment with Stripe Elements using the client
//! secret; Stripe reports the outcome asynchronously through the webhook.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use intent_payments::{PaymentIntentRequest, PaymentProcessor, StripeProcessor};
//! use serde_json::json;
//!
//! let processor = StripeProcessor::new("sk_test_xxx");
//! let request = PaymentIntentRequest::from_parts(&json!(2500), Some(&json!("usd")), None)?;
//! let intent = processor.create_payment_intent(&request).await?;
//!
//! // Hand intent.client_secret to the front-end
//! ```

mod error;
mod intent;
mod mock;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod validation;
mod webhook;

pub use error::{PaymentError, Result};
pub use intent::{
    coerce_metadata, coerce_metadata_value, PaymentIntentRequest, PaymentIntentResult,
    PaymentProcessor, StripeProcessor,
};
pub use mock::MockPaymentProcessor;
pub use validation::{is_valid_amount, is_valid_currency, Amount, Currency, MAX_AMOUNT_CENTS};
pub use webhook::{WebhookEvent, WebhookHandler, SIGNATURE_TOLERANCE_SECS};
