//! Webhook Test Fixtures
//!
//! Signed Stripe payloads for exercising the webhook path without Stripe.
//! Available under `cfg(test)` and the `test-util` feature.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

/// Produce a `stripe-signature` header value for `payload`
pub fn sign_payload(secret: &str, timestamp: i64, payload: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts any key length"));
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

/// A complete `payment_intent.*` event as Stripe delivers it
///
/// `failure_message` fills `data.object.last_payment_error.message`.
pub fn payment_intent_event(event_type: &str, failure_message: Option<&str>) -> String {
    let failed = failure_message.is_some();
    let last_payment_error = failure_message.map(|message| {
        json!({
            "type": "card_error",
            "message": message,
            "decline_code": "insufficient_funds",
            "doc_url": "https://stripe.com/docs/error-codes/card-declined"
        })
    });

    json!({
        "id": "evt_3OZt2LJfixture0001",
        "object": "event",
        "api_version": "2023-10-16",
        "created": 1_704_067_200,
        "data": {
            "object": {
                "id": "pi_3OZt2LJfixture0001",
                "object": "payment_intent",
                "amount": 2500,
                "amount_capturable": 0,
                "amount_received": if failed { 0 } else { 2500 },
                "capture_method": "automatic",
                "client_secret": "pi_3OZt2LJfixture0001_secret_abc",
                "confirmation_method": "automatic",
                "created": 1_704_067_190,
                "currency": "usd",
                "last_payment_error": last_payment_error,
                "livemode": false,
                "metadata": {"orderId": "42"},
                "payment_method_types": ["card"],
                "status": if failed { "requires_payment_method" } else { "succeeded" }
            }
        },
        "livemode": false,
        "pending_webhooks": 1,
        "request": {"id": null, "idempotency_key": null},
        "type": event_type
    })
    .to_string()
}
