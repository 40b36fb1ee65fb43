use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::MessagingProvider;

const TWILIO_API: &str = "https://api.twilio.com/2010-04-01";

/// SMS delivery through the Twilio Messages API.
pub struct TwilioSmsProvider {
    account_sid: String,
    auth_token: String,
    from_number: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct MessageResource {
    sid: String,
    status: Option<String>,
}

#[derive(Deserialize)]
struct TwilioError {
    code: Option<i64>,
    message: String,
}

impl TwilioSmsProvider {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            account_sid,
            auth_token,
            from_number,
            client: reqwest::Client::new(),
        }
    }

    fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_number.is_empty()
    }
}

#[async_trait]
impl MessagingProvider for TwilioSmsProvider {
    async fn send_message(&self, to: &str, body: &str) -> anyhow::Result<()> {
        if !self.is_configured() {
            tracing::warn!(to, "Twilio not configured, SMS skipped");
            return Ok(());
        }

        let url = format!("{TWILIO_API}/Accounts/{}/Messages.json", self.account_sid);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .context("failed to reach Twilio")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = match resp.json::<TwilioError>().await {
                Ok(err) => format!("{} (code {})", err.message, err.code.unwrap_or_default()),
                Err(_) => status.to_string(),
            };
            anyhow::bail!("Twilio rejected SMS to {to}: {detail}");
        }

        let message: MessageResource = resp
            .json()
            .await
            .context("unexpected Twilio response")?;
        tracing::info!(
            to,
            sid = %message.sid,
            status = message.status.as_deref().unwrap_or("unknown"),
            "SMS sent"
        );
        Ok(())
    }
}
