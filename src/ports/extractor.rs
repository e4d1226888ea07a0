//! Symptom extraction port.
//!
//! Turns free text and questionnaire answers into a symptom set, a risk
//! triple, and advisory text. Implementations never fail the request: they
//! report `Unavailable` and the caller picks the static fallback.

use async_trait::async_trait;

use crate::domain::{Advisory, Language, Questionnaire, RiskTriple, SymptomSet};

/// Input handed to an extractor.
#[derive(Debug, Clone)]
pub struct ExtractionRequest<'a> {
    /// Free-text description (may be empty).
    pub message: &'a str,
    /// Structured answers (may be empty).
    pub questionnaire: &'a Questionnaire,
    /// Language the advisory text should be written in.
    pub language: Language,
}

impl ExtractionRequest<'_> {
    /// Whether there is anything to extract from.
    ///
    /// Messages of two characters or fewer are treated as empty.
    #[must_use]
    pub fn has_input(&self) -> bool {
        self.message.trim().chars().count() > 2 || !self.questionnaire.is_empty()
    }
}

/// Successful extraction result.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub symptoms: SymptomSet,
    pub risks: RiskTriple,
    pub advisory: Advisory,
}

/// Extraction either yields data or explains why it could not.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Extracted(Extraction),
    Unavailable(String),
}

/// Errors an extractor may hit internally before mapping to `Unavailable`.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Response contained no message content")]
    EmptyResponse,

    #[error("Response was not a JSON object: {0}")]
    MalformedJson(String),
}

impl From<Result<Extraction, ExtractionError>> for ExtractionOutcome {
    fn from(result: Result<Extraction, ExtractionError>) -> Self {
        match result {
            Ok(extraction) => Self::Extracted(extraction),
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }
}

/// Capability that performs the extraction step.
#[async_trait]
pub trait SymptomExtractor: Send + Sync {
    /// Short name for logs (`mock`, `openai`).
    fn name(&self) -> &'static str;

    /// Run extraction for the given input.
    async fn extract(&self, request: &ExtractionRequest<'_>) -> ExtractionOutcome;
}
