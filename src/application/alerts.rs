//! High-risk SMS alerts.
//!
//! At most one attempt per prediction, only for users with a phone number on
//! file, and only when some percentage is strictly above the threshold.
//! Failures are logged and never reach the caller.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{Language, RiskTriple, ALERT_THRESHOLD};
use crate::ports::{AlertReceipt, AlertSender};

pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:5000";

/// What happened when a prediction was checked for alerting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertAttempt {
    /// Nothing above the threshold.
    BelowThreshold,
    /// Above threshold but no phone number to send to.
    NoRecipient,
    /// Handed to the sender.
    Dispatched(AlertReceipt),
    /// The sender returned an error (already logged).
    Failed(String),
}

/// Threshold, link construction and message text.
#[derive(Debug, Clone)]
pub struct AlertPolicy {
    threshold: u8,
    public_url_file: PathBuf,
}

impl AlertPolicy {
    #[must_use]
    pub fn new(public_url_file: impl Into<PathBuf>) -> Self {
        Self {
            threshold: ALERT_THRESHOLD,
            public_url_file: public_url_file.into(),
        }
    }

    /// Base URL from the public URL file, read on every call so a tunnel can
    /// rewrite it while the server runs.
    #[must_use]
    pub fn public_base_url(&self) -> String {
        std::fs::read_to_string(&self.public_url_file)
            .ok()
            .map(|content| content.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string())
    }

    #[must_use]
    pub fn report_link(&self, record_id: i64) -> String {
        format!("{}/report/{}", self.public_base_url(), record_id)
    }

    /// Localized SMS body, or `None` when nothing crosses the threshold.
    #[must_use]
    pub fn compose(&self, risks: &RiskTriple, record_id: i64, language: Language) -> Option<String> {
        let flagged = risks.above(self.threshold);
        if flagged.is_empty() {
            return None;
        }
        Some(language.alert_message(&flagged, &self.report_link(record_id)))
    }
}

/// Applies the policy and hands messages to an [`AlertSender`].
pub struct AlertDispatcher {
    sender: Arc<dyn AlertSender>,
    policy: AlertPolicy,
}

impl AlertDispatcher {
    #[must_use]
    pub fn new(sender: Arc<dyn AlertSender>, policy: AlertPolicy) -> Self {
        Self { sender, policy }
    }

    /// Best-effort notification for one stored record.
    pub async fn notify(
        &self,
        phone: Option<&str>,
        risks: &RiskTriple,
        record_id: i64,
        language: Language,
    ) -> AlertAttempt {
        if !risks.any_above(self.policy.threshold) {
            return AlertAttempt::BelowThreshold;
        }
        let Some(phone) = phone else {
            tracing::debug!("Record {} is high risk but no phone is on file", record_id);
            return AlertAttempt::NoRecipient;
        };
        let Some(body) = self.policy.compose(risks, record_id, language) else {
            return AlertAttempt::BelowThreshold;
        };

        match self.sender.send(phone, &body).await {
            Ok(receipt) => {
                tracing::info!("High-risk alert for record {} dispatched to {}", record_id, phone);
                AlertAttempt::Dispatched(receipt)
            }
            Err(e) => {
                tracing::warn!("Failed to send alert for record {}: {}", record_id, e);
                AlertAttempt::Failed(e.to_string())
            }
        }
    }
}
