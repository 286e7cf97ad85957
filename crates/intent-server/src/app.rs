//! Router Assembly

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::cors::cors_gate;
use crate::handlers::{create_payment_intent, root, stripe_webhook};
use crate::state::AppState;

/// Build the application router
///
/// Layers run outside-in: tracing, then the origin gate, then CORS headers.
pub fn router(state: AppState) -> Router {
    let cors = state.origins.layer();

    Router::new()
        .route("/", get(root))
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/webhook", post(stripe_webhook))
        .layer(cors)
        .layer(middleware::from_fn_with_state(state.origins.clone(), cors_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use intent_payments::testing::{payment_intent_event, sign_payload};
    use intent_payments::{MockPaymentProcessor, PaymentProcessor};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use tracing_subscriber::fmt::MakeWriter;

    use crate::config::Config;
    use crate::cors::OriginAllowList;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    fn app_with(config: &Config, processor: Arc<MockPaymentProcessor>) -> Router {
        let processor: Arc<dyn PaymentProcessor> = processor;
        router(AppState::with_processor(config, Some(processor)))
    }

    fn json_post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn webhook_post(payload: &[u8], signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/webhook");
        if let Some(signature) = signature {
            builder = builder.header("stripe-signature", signature);
        }
        builder.body(Body::from(payload.to_vec())).unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_root_health() {
        let app = app_with(&Config::default(), Arc::new(MockPaymentProcessor::default()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"Stripe backend OK");
    }

    #[tokio::test]
    async fn test_create_payment_intent_success() {
        let processor = Arc::new(MockPaymentProcessor::new("pi_123_secret_abc"));
        let app = app_with(&Config::default(), processor.clone());

        let response = app
            .oneshot(json_post(
                "/create-payment-intent",
                &json!({"amountInCents": 2500, "currency": "USD", "metadata": {"orderId": 42}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"clientSecret": "pi_123_secret_abc"}));

        let calls = processor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].amount.cents(), 2500);
        assert_eq!(calls[0].currency.as_str(), "usd");
        assert_eq!(calls[0].metadata["orderId"], "42");
    }

    #[tokio::test]
    async fn test_invalid_amount_never_reaches_processor() {
        let processor = Arc::new(MockPaymentProcessor::default());
        let app = app_with(&Config::default(), processor.clone());

        let response = app
            .oneshot(json_post("/create-payment-intent", &json!({"amountInCents": -5})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "Invalid amount"}));
        assert!(processor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_amount_is_invalid() {
        let processor = Arc::new(MockPaymentProcessor::default());
        let app = app_with(&Config::default(), processor.clone());

        let response = app
            .oneshot(json_post("/create-payment-intent", &json!({"currency": "usd"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "Invalid amount"}));
    }

    #[tokio::test]
    async fn test_unsupported_currency() {
        let processor = Arc::new(MockPaymentProcessor::default());
        let app = app_with(&Config::default(), processor.clone());

        let response = app
            .oneshot(json_post(
                "/create-payment-intent",
                &json!({"amountInCents": 1000, "currency": "jpy"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "Unsupported currency"}));
        assert!(processor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_processor_failure_is_opaque() {
        let processor = Arc::new(MockPaymentProcessor::failing("Invalid API Key provided: sk_test_***"));
        let app = app_with(&Config::default(), processor.clone());

        let response = app
            .oneshot(json_post("/create-payment-intent", &json!({"amountInCents": 2500})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "Server error"}));
        assert_eq!(processor.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_processor_is_server_error() {
        let app = router(AppState::with_processor(&Config::default(), None));

        let response = app
            .oneshot(json_post("/create-payment-intent", &json!({"amountInCents": 2500})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "Server error"}));
    }

    #[tokio::test]
    async fn test_webhook_invalid_signature() {
        let config = Config {
            webhook_secret: Some(WEBHOOK_SECRET.into()),
            ..Config::default()
        };
        let app = app_with(&config, Arc::new(MockPaymentProcessor::default()));
        let payload = payment_intent_event("payment_intent.succeeded", None);
        let signature = format!("t={},v1={}", chrono::Utc::now().timestamp(), "ab".repeat(32));

        let response = app.oneshot(webhook_post(payload.as_bytes(), Some(&signature))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.starts_with("Webhook Error:"), "{body}");
    }

    #[tokio::test]
    async fn test_webhook_missing_signature() {
        let config = Config {
            webhook_secret: Some(WEBHOOK_SECRET.into()),
            ..Config::default()
        };
        let app = app_with(&config, Arc::new(MockPaymentProcessor::default()));

        let response = app.oneshot(webhook_post(b"{}", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.contains("Webhook Error:"));
    }

    #[tokio::test]
    async fn test_webhook_payment_failed_logs_warning() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = Config {
            webhook_secret: Some(WEBHOOK_SECRET.into()),
            ..Config::default()
        };
        let app = app_with(&config, Arc::new(MockPaymentProcessor::default()));
        let payload = payment_intent_event(
            "payment_intent.payment_failed",
            Some("Your card has insufficient funds."),
        );
        let signature = sign_payload(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), &payload);

        let response = app.oneshot(webhook_post(payload.as_bytes(), Some(&signature))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"received": true}));

        let output = logs.contents();
        let warning = output
            .lines()
            .find(|line| line.contains("WARN") && line.contains("Payment failed"))
            .unwrap_or_else(|| panic!("no payment failure warning in:\n{output}"));
        assert!(warning.contains("Your card has insufficient funds."));
        assert!(warning.contains("pi_3OZt2LJfixture0001"));
    }

    #[tokio::test]
    async fn test_webhook_extreme_timestamp_is_bad_request() {
        let config = Config {
            webhook_secret: Some(WEBHOOK_SECRET.into()),
            ..Config::default()
        };
        let app = app_with(&config, Arc::new(MockPaymentProcessor::default()));
        let payload = payment_intent_event("payment_intent.succeeded", None);
        let signature = sign_payload(WEBHOOK_SECRET, i64::MIN, &payload);

        let response = app.oneshot(webhook_post(payload.as_bytes(), Some(&signature))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.contains("tolerance"), "{body}");
    }

    #[tokio::test]
    async fn test_webhook_unhandled_type_acknowledged() {
        let app = app_with(&Config::default(), Arc::new(MockPaymentProcessor::default()));

        let payload = payment_intent_event("payment_intent.created", None);

        let response = app.oneshot(webhook_post(payload.as_bytes(), None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"received": true}));
    }

    #[tokio::test]
    async fn test_webhook_unverified_malformed_body() {
        let app = app_with(&Config::default(), Arc::new(MockPaymentProcessor::default()));

        let response = app.oneshot(webhook_post(b"not json", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.starts_with("Webhook Error:"));
    }

    #[tokio::test]
    async fn test_webhook_signature_required_without_secret() {
        let config = Config {
            require_signed_webhooks: true,
            ..Config::default()
        };
        let app = app_with(&config, Arc::new(MockPaymentProcessor::default()));

        let payload = payment_intent_event("payment_intent.succeeded", None);

        let response = app.oneshot(webhook_post(payload.as_bytes(), None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_disallowed_origin_rejected_before_handler() {
        let config = Config {
            allowed_origins: OriginAllowList::parse("https://shop.example"),
            ..Config::default()
        };
        let processor = Arc::new(MockPaymentProcessor::default());
        let app = app_with(&config, processor.clone());

        let mut request = json_post("/create-payment-intent", &json!({"amountInCents": 2500}));
        request
            .headers_mut()
            .insert("origin", "https://evil.example".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(processor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_allowed_origin_gets_cors_headers() {
        let config = Config {
            allowed_origins: OriginAllowList::parse("https://shop.example"),
            ..Config::default()
        };
        let processor = Arc::new(MockPaymentProcessor::default());
        let app = app_with(&config, processor.clone());

        let mut request = json_post("/create-payment-intent", &json!({"amountInCents": 2500}));
        request
            .headers_mut()
            .insert("origin", "https://shop.example".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://shop.example"
        );
        assert_eq!(processor.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_request_without_origin_permitted() {
        let config = Config {
            allowed_origins: OriginAllowList::parse("https://shop.example"),
            ..Config::default()
        };
        let app = app_with(&config, Arc::new(MockPaymentProcessor::default()));

        let response = app
            .oneshot(json_post("/create-payment-intent", &json!({"amountInCents": 2500})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
