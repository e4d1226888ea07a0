//! Persisted entities: user profiles and the append-only health record log.

use serde::{Deserialize, Serialize};

use super::risk::RiskTriple;

/// Username recorded for predictions made without a session.
pub const GUEST_USERNAME: &str = "Guest";

/// Stored in place of the free-text input when only a questionnaire was sent.
pub const QUESTIONNAIRE_PLACEHOLDER: &str = "Q&A Analysis";

/// A registered user.
///
/// The password is only ever held as an Argon2id PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub phone: Option<String>,
}

impl User {
    /// Phone number usable for alerts (non-blank).
    #[must_use]
    pub fn alert_phone(&self) -> Option<&str> {
        self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

/// Fields needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub phone: Option<String>,
}

/// Profile changes; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.password_hash.is_none()
    }
}

/// One prediction, as written to the log. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: i64,
    pub username: String,
    pub symptoms: String,
    pub risks: RiskTriple,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A record about to be appended.
#[derive(Debug, Clone)]
pub struct NewHealthRecord {
    pub username: String,
    pub symptoms: String,
    pub risks: RiskTriple,
}

impl NewHealthRecord {
    /// Build a record, substituting the guest marker and questionnaire placeholder.
    #[must_use]
    pub fn new(username: Option<&str>, message: &str, risks: RiskTriple) -> Self {
        Self {
            username: username.unwrap_or(GUEST_USERNAME).to_string(),
            symptoms: if message.is_empty() {
                QUESTIONNAIRE_PLACEHOLDER.to_string()
            } else {
                message.to_string()
            },
            risks,
        }
    }
}
