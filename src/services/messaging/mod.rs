pub mod twilio;

use async_trait::async_trait;

/// Outbound SMS. Implementations with no credentials skip the send and return `Ok`.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send_message(&self, to: &str, body: &str) -> anyhow::Result<()>;
}
