pub mod sendgrid;

use async_trait::async_trait;

/// Outbound transactional mail. Implementations with no API key skip the send and return `Ok`.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}
