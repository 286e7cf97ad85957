//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Amount is not an integer in `1..=MAX_AMOUNT_CENTS`
    #[error("Invalid amount")]
    InvalidAmount,

    /// Currency is not in the allow-set
    #[error("Unsupported currency")]
    UnsupportedCurrency,

    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Processor has not been configured (missing API key)
    #[error("Payment processor not configured: {0}")]
    NotConfigured(String),

    /// Webhook signature verification failed
    #[error("{0}")]
    WebhookSignature(String),

    /// Webhook payload parsing failed
    #[error("{0}")]
    WebhookParse(String),
}

impl PaymentError {
    /// Whether the caller caused this error (4xx) rather than the server (5xx)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PaymentError::InvalidAmount
                | PaymentError::UnsupportedCurrency
                | PaymentError::WebhookSignature(_)
                | PaymentError::WebhookParse(_)
        )
    }

    /// Get user-friendly message
    ///
    /// Processor failures collapse to a generic message so that Stripe
    /// details never reach the caller.
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::InvalidAmount => "Invalid amount",
            PaymentError::UnsupportedCurrency => "Unsupported currency",
            PaymentError::WebhookSignature(reason) | PaymentError::WebhookParse(reason) => reason,
            PaymentError::Stripe(_) | PaymentError::NotConfigured(_) => "Server error",
        }
    }
}
