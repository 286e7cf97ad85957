//! Mock Payment Processor
//!
//! For testing and local demos. Records every request it receives.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PaymentError, Result};
use crate::intent::{PaymentIntentRequest, PaymentIntentResult, PaymentProcessor};

/// Mock processor returning a fixed client secret or a fixed failure
pub struct MockPaymentProcessor {
    client_secret: String,
    failure: Option<String>,
    calls: Mutex<Vec<PaymentIntentRequest>>,
}

impl Default for MockPaymentProcessor {
    fn default() -> Self {
        Self::new("pi_mock_secret_mock")
    }
}

impl MockPaymentProcessor {
    pub fn new(client_secret: impl Into<String>) -> Self {
        Self {
            client_secret: client_secret.into(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a processor whose every call fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            client_secret: String::new(),
            failure: Some(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in call order
    pub fn calls(&self) -> Vec<PaymentIntentRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntentResult> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        if let Some(ref message) = self.failure {
            return Err(PaymentError::Stripe(message.clone()));
        }

        let count = self.calls.lock().map(|calls| calls.len()).unwrap_or(0);
        Ok(PaymentIntentResult {
            id: format!("pi_mock_{count}"),
            client_secret: self.client_secret.clone(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
