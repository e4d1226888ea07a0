//! Alert port: outbound SMS delivery.

use async_trait::async_trait;

/// Errors from an alert provider.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// What happened to one alert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertReceipt {
    /// Accepted by the provider, with its message id.
    Sent(String),
    /// No provider configured; nothing left the process.
    Skipped,
}

/// Capability that delivers an SMS.
#[async_trait]
pub trait AlertSender: Send + Sync {
    /// Deliver `body` to `to`.
    ///
    /// # Errors
    /// Returns error if the provider cannot be reached or rejects the message.
    async fn send(&self, to: &str, body: &str) -> Result<AlertReceipt, AlertError>;
}
