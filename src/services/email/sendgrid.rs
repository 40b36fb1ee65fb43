use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::EmailProvider;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridEmailProvider {
    api_key: String,
    from_email: String,
    client: reqwest::Client,
}

impl SendGridEmailProvider {
    pub fn new(api_key: String, from_email: String) -> Self {
        Self {
            api_key,
            from_email,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailProvider for SendGridEmailProvider {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            tracing::warn!(to, subject, "SendGrid API key not configured, email not sent");
            return Ok(());
        }

        let body = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from_email },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html }],
        });

        let resp = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to reach SendGrid")?
            .error_for_status()
            .context("SendGrid API returned error")?;

        tracing::info!(to, status = %resp.status(), "email sent");
        Ok(())
    }
}
