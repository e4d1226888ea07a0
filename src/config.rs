//! Runtime configuration read from the environment.
//!
//! `Config::from_env()` is used by the binary; tests go through
//! `Config::from_lookup` with a map-backed closure.

use std::path::PathBuf;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::adapters::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::adapters::TwilioCredentials;

/// Placeholder SID shipped in sample environments; treated as unset.
const PLACEHOLDER_TWILIO_SID: &str = "YOUR_TWILIO_SID";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Credentials and endpoint for the live extractor.
#[derive(Clone)]
pub struct OpenAiSettings {
    pub api_key: Zeroizing<String>,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub model_dir: PathBuf,
    pub public_url_file: PathBuf,
    pub http_timeout: Duration,
    /// `None` selects the offline mock extractor.
    pub openai: Option<OpenAiSettings>,
    /// `None` disables SMS alerts.
    pub twilio: Option<TwilioCredentials>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    /// Returns error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns error if a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));

        let port = match get("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber { var: "PORT", value })?,
            None => 5000,
        };
        let timeout_secs = match get("HEALIX_HTTP_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                var: "HEALIX_HTTP_TIMEOUT_SECS",
                value,
            })?,
            None => 30,
        };

        let openai = get("OPENAI_API_KEY").map(|key| OpenAiSettings {
            api_key: Zeroizing::new(key),
            model: get("HEALIX_OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("HEALIX_OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        });

        let twilio = match (
            get("TWILIO_ACCOUNT_SID").filter(|sid| sid != PLACEHOLDER_TWILIO_SID),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(token), Some(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token: Zeroizing::new(token),
                from_number,
            }),
            _ => None,
        };

        Ok(Self {
            bind: get("HEALIX_BIND").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            db_path: get("HEALIX_DB_PATH").map_or_else(|| PathBuf::from("healix.db"), PathBuf::from),
            model_dir: get("HEALIX_MODEL_PATH").map_or_else(|| PathBuf::from("models"), PathBuf::from),
            public_url_file: get("HEALIX_PUBLIC_URL_FILE")
                .map_or_else(|| PathBuf::from("public_url.txt"), PathBuf::from),
            http_timeout: Duration::from_secs(timeout_secs),
            openai,
            twilio,
        })
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
