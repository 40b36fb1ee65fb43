pub mod stripe;
pub mod webhook;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::AppError;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider not configured")]
    NotConfigured,

    /// The provider's own error message, passed through as-is.
    #[error("{0}")]
    Provider(String),

    #[error("payment request failed: {0}")]
    Transport(String),
}

impl From<PaymentError> for AppError {
    fn from(e: PaymentError) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct IntentRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Refund {
    pub id: String,
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, req: &IntentRequest)
        -> Result<PaymentIntent, PaymentError>;

    async fn refund(&self, payment_intent_id: &str) -> Result<Refund, PaymentError>;
}

/// Currencies Stripe charges in whole units.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

pub fn to_minor_units(amount: f64, currency: &str) -> i64 {
    let currency = currency.to_lowercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&currency.as_str()) {
        amount.round() as i64
    } else {
        (amount * 100.0).round() as i64
    }
}
