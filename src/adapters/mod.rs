//! Adapters layer: Concrete implementations of ports.
//!
//! - `sqlite`: users and the append-only health-record log
//! - `models`: logistic classifiers loaded from exported JSON
//! - `mock` / `openai`: symptom extractors
//! - `twilio`: SMS alerts
//! - `pdf`: report rendering
//! - `sanitize`: PII filtering for logs

pub mod mock;
pub mod models;
pub mod openai;
pub mod pdf;
pub mod sanitize;
pub mod sqlite;
pub mod twilio;

pub use mock::MockExtractor;
pub use models::{LogisticModel, RiskModels};
pub use openai::OpenAiExtractor;
pub use pdf::{render_report, ReportDocument, ReportError, REPORT_FILE_NAME};
pub use sqlite::{SqliteStorage, StorageError};
pub use twilio::{DisabledAlerts, TwilioCredentials, TwilioSms};
