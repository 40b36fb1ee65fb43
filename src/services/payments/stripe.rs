use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;

use super::{IntentRequest, PaymentError, PaymentGateway, PaymentIntent, Refund};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

pub struct StripeGateway {
    secret_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    client_secret: Option<String>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct StripeRefund {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    message: String,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key,
            client: reqwest::Client::new(),
        }
    }

    fn auth_header(&self) -> String {
        let credentials = format!("{}:", self.secret_key);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes())
        )
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, PaymentError> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        let resp = self
            .client
            .post(format!("{STRIPE_API_BASE}{path}"))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .form(form)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| format!("Stripe returned {status}"));
            tracing::warn!(path, %status, %message, "Stripe request rejected");
            return Err(PaymentError::Provider(message));
        }

        serde_json::from_str(&text).map_err(|e| PaymentError::Transport(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        req: &IntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut form = vec![
            ("amount".to_string(), req.amount_minor.to_string()),
            ("currency".to_string(), req.currency.clone()),
            ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
        ];
        for (key, value) in &req.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        let intent: StripePaymentIntent = self.post_form("/payment_intents", &form).await?;
        tracing::info!(payment_intent_id = %intent.id, amount = req.amount_minor, "payment intent created");

        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
            status: intent.status,
        })
    }

    async fn refund(&self, payment_intent_id: &str) -> Result<Refund, PaymentError> {
        let form = vec![
            ("payment_intent".to_string(), payment_intent_id.to_string()),
            ("reason".to_string(), "requested_by_customer".to_string()),
        ];
        let refund: StripeRefund = self.post_form("/refunds", &form).await?;
        tracing::info!(refund_id = %refund.id, payment_intent_id, "refund created");

        Ok(Refund {
            id: refund.id,
            status: refund.status,
        })
    }
}
