//! SMS delivery through the Twilio Messages API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::ports::{AlertError, AlertReceipt, AlertSender};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Account credentials and sender number.
#[derive(Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: Zeroizing<String>,
    pub from_number: String,
}

impl std::fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &"[REDACTED]")
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

pub struct TwilioSms {
    client: reqwest::Client,
    credentials: TwilioCredentials,
    api_base: String,
}

impl TwilioSms {
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(credentials: TwilioCredentials, timeout: Duration) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, credentials))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, credentials: TwilioCredentials) -> Self {
        Self {
            client,
            credentials,
            api_base: TWILIO_API_BASE.to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.api_base, self.credentials.account_sid
        )
    }
}

#[async_trait]
impl AlertSender for TwilioSms {
    async fn send(&self, to: &str, body: &str) -> Result<AlertReceipt, AlertError> {
        let params = [
            ("To", to),
            ("From", self.credentials.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(self.credentials.auth_token.as_str()),
            )
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessageResponse = response.json().await?;
        tracing::info!("SMS accepted by provider");
        Ok(AlertReceipt::Sent(message.sid))
    }
}

/// Sender used when no SMS provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAlerts;

#[async_trait]
impl AlertSender for DisabledAlerts {
    async fn send(&self, _to: &str, _body: &str) -> Result<AlertReceipt, AlertError> {
        tracing::warn!("SMS alert skipped: provider not configured");
        Ok(AlertReceipt::Skipped)
    }
}
