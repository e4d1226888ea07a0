//! # Healix
//!
//! Symptom-driven risk screening for diabetes, heart disease and kidney
//! disease, served over HTTP.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (features, symptoms, risks, records)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (SQLite, JSON models, OpenAI, Twilio, PDF)
//! - `application`: Use cases orchestrating domain and ports
//! - `http`: axum router, sessions and pages
//! - `config`: environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod ports;

pub use domain::{FeatureVector, HealthRecord, RiskTriple};

/// Main error type for Healix
#[derive(Debug, thiserror::Error)]
pub enum HealixError {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Model error: {0}")]
    Model(#[from] ports::ModelError),

    #[error("Password error: {0}")]
    Password(#[from] domain::password::PasswordError),

    #[error("Report rendering failed: {0}")]
    Report(#[from] adapters::ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl HealixError {
    /// Lift a storage error, surfacing not-found and conflict as their own kinds.
    pub fn from_storage(err: impl Into<adapters::StorageError>) -> Self {
        match err.into() {
            adapters::StorageError::NotFound(what) => Self::NotFound(what),
            adapters::StorageError::Conflict(what) => Self::Conflict(what),
            other => Self::Storage(other),
        }
    }
}
