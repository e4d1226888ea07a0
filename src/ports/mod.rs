//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (language model, SMS
//! provider, storage, pre-trained classifiers).

mod alert;
mod classifier;
mod extractor;
mod storage;

pub use alert::{AlertError, AlertReceipt, AlertSender};
pub use classifier::{ModelError, RiskClassifier};
pub use extractor::{
    Extraction, ExtractionError, ExtractionOutcome, ExtractionRequest, SymptomExtractor,
};
pub use storage::Storage;
