//! HTTP Handlers

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use intent_payments::{PaymentError, PaymentIntentRequest};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentBody {
    /// Kept loose so that non-integer input maps to "Invalid amount"
    #[serde(default)]
    pub amount_in_cents: Value,
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &PaymentError) -> ApiError {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: err.user_message().into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness probe
pub async fn root() -> &'static str {
    "Stripe backend OK"
}

/// Validate the request and create a Stripe payment intent
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentIntentBody>,
) -> Result<Json<CreatePaymentIntentResponse>, ApiError> {
    let request = PaymentIntentRequest::from_parts(
        &payload.amount_in_cents,
        payload.currency.as_ref(),
        payload.metadata.as_ref(),
    )
    .map_err(|e| api_error(&e))?;

    let processor = state.processor.as_ref().ok_or_else(|| {
        let err = PaymentError::NotConfigured("STRIPE_SECRET_KEY not set".into());
        tracing::error!("Create payment intent error: {}", err);
        api_error(&err)
    })?;

    let intent = processor.create_payment_intent(&request).await.map_err(|e| {
        tracing::error!(
            processor = processor.name(),
            amount = request.amount.cents(),
            currency = %request.currency,
            "Create payment intent error: {}",
            e
        );
        api_error(&e)
    })?;

    tracing::info!(
        payment_intent_id = %intent.id,
        amount = request.amount.cents(),
        currency = %request.currency,
        "Payment intent created"
    );

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Stripe webhook endpoint; the body must stay raw for signature checks
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, (StatusCode, String)> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());

    let event = state.webhooks.parse_event(&body, signature).map_err(|e| {
        tracing::warn!("Webhook verification failed: {}", e);
        (StatusCode::BAD_REQUEST, format!("Webhook Error: {e}"))
    })?;

    state.webhooks.handle(&event);

    Ok(Json(WebhookAck { received: true }))
}
