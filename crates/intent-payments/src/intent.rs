//! Payment Intent Creation
//!
//! Validated request model, metadata coercion, and the processor boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stripe::{
    Client, CreatePaymentIntent, CreatePaymentIntentAutomaticPaymentMethods,
    Currency as StripeCurrency, PaymentIntent,
};

use crate::error::{PaymentError, Result};
use crate::validation::{Amount, Currency};

/// A validated request to create a payment intent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in minor units
    pub amount: Amount,

    /// Settlement currency
    pub currency: Currency,

    /// Metadata attached to the intent, already coerced to strings
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentRequest {
    /// Build a request from loosely-typed client input
    ///
    /// The amount is checked before the currency. A missing currency
    /// defaults to USD and missing metadata to an empty map.
    pub fn from_parts(
        amount: &Value,
        currency: Option<&Value>,
        metadata: Option<&Value>,
    ) -> Result<Self> {
        let amount = Amount::parse(amount).ok_or(PaymentError::InvalidAmount)?;

        let currency = match currency {
            None | Some(Value::Null) => Currency::default(),
            Some(Value::String(code)) => {
                Currency::parse(code).ok_or(PaymentError::UnsupportedCurrency)?
            }
            Some(_) => return Err(PaymentError::UnsupportedCurrency),
        };

        let metadata = match metadata {
            Some(Value::Object(map)) => coerce_metadata(map),
            _ => HashMap::new(),
        };

        Ok(Self {
            amount,
            currency,
            metadata,
        })
    }
}

/// Result of creating a payment intent
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentIntentResult {
    /// Processor-side intent ID
    pub id: String,

    /// Secret the front-end uses to complete payment
    pub client_secret: String,
}

/// Stringify a single metadata value
///
/// Total over JSON: strings pass through unchanged, scalars use their
/// display form and arrays/objects become compact JSON.
pub fn coerce_metadata_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Stringify every value of a metadata object
pub fn coerce_metadata(map: &serde_json::Map<String, Value>) -> HashMap<String, String> {
    map.iter()
        .map(|(key, value)| (key.clone(), coerce_metadata_value(value)))
        .collect()
}

/// Payment processor trait (Strategy pattern)
///
/// Implemented by [`StripeProcessor`] for real traffic and
/// [`MockPaymentProcessor`](crate::MockPaymentProcessor) for tests.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a payment intent with automatic payment methods enabled
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntentResult>;

    /// Processor name
    fn name(&self) -> &str;
}

/// Stripe-backed payment processor
pub struct StripeProcessor {
    client: Client,
}

impl StripeProcessor {
    /// Create a new Stripe processor
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }
}

fn stripe_currency(currency: Currency) -> StripeCurrency {
    match currency {
        Currency::Usd => StripeCurrency::USD,
        Currency::Cad => StripeCurrency::CAD,
        Currency::Eur => StripeCurrency::EUR,
        Currency::Gbp => StripeCurrency::GBP,
        Currency::Aud => StripeCurrency::AUD,
    }
}

/// Stripe create parameters for a validated request
fn intent_params(request: &PaymentIntentRequest) -> CreatePaymentIntent<'_> {
    let mut params = CreatePaymentIntent::new(request.amount.cents(), stripe_currency(request.currency));
    params.metadata = Some(request.metadata.clone());
    params.automatic_payment_methods = Some(CreatePaymentIntentAutomaticPaymentMethods {
        allow_redirects: None,
        enabled: true,
    });
    params
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntentResult> {
        let intent = PaymentIntent::create(&self.client, intent_params(request))
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let client_secret = intent
            .client_secret
            .ok_or_else(|| PaymentError::Stripe("No client secret returned".into()))?;

        tracing::debug!(
            payment_intent_id = %intent.id,
            amount = request.amount.cents(),
            currency = %request.currency,
            "Created payment intent"
        );

        Ok(PaymentIntentResult {
            id: intent.id.to_string(),
            client_secret,
        })
    }

    fn name(&self) -> &str {
        "stripe"
    }
}
