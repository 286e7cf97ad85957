//! Amount and Currency Validation
//!
//! Pure checks applied to client-submitted values before any processor call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest accepted amount in minor units ($500,000.00)
pub const MAX_AMOUNT_CENTS: i64 = 500_000_000;

/// A validated amount in minor units
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    /// Validate an integer amount
    pub fn new(cents: i64) -> Option<Self> {
        (1..=MAX_AMOUNT_CENTS).contains(&cents).then_some(Self(cents))
    }

    /// Validate a JSON value
    ///
    /// Integer-valued floats such as `2500.0` are accepted. Strings,
    /// fractional numbers and every other JSON type are rejected.
    pub fn parse(value: &Value) -> Option<Self> {
        let Value::Number(number) = value else {
            return None;
        };

        if let Some(cents) = number.as_i64() {
            return Self::new(cents);
        }

        // u64 beyond i64::MAX is over the ceiling anyway
        let float = number.as_f64()?;
        #[allow(clippy::cast_precision_loss)]
        let max = MAX_AMOUNT_CENTS as f64;
        if float.fract() != 0.0 || !(1.0..=max).contains(&float) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let cents = float as i64;
        Self::new(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

/// Supported settlement currencies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Cad,
    Eur,
    Gbp,
    Aud,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Cad,
        Currency::Eur,
        Currency::Gbp,
        Currency::Aud,
    ];

    /// Parse a currency code, case-insensitively
    pub fn parse(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "usd" => Some(Currency::Usd),
            "cad" => Some(Currency::Cad),
            "eur" => Some(Currency::Eur),
            "gbp" => Some(Currency::Gbp),
            "aud" => Some(Currency::Aud),
            _ => None,
        }
    }

    /// Lower-case ISO code as sent to Stripe
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Cad => "cad",
            Currency::Eur => "eur",
            Currency::Gbp => "gbp",
            Currency::Aud => "aud",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True iff `amount` is an integer in `1..=MAX_AMOUNT_CENTS`
pub fn is_valid_amount(amount: &Value) -> bool {
    Amount::parse(amount).is_some()
}

/// True iff the lower-cased `code` is a supported currency
pub fn is_valid_currency(code: &str) -> bool {
    Currency::parse(code).is_some()
}
