//! Prediction service: the risk estimation pipeline.
//!
//! This service coordinates:
//! - Feature resolution from the raw request
//! - Optional symptom extraction and feature adjustment
//! - The extraction-or-classifier decision
//! - Record persistence
//! - High-risk alerting

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::adapters::RiskModels;
use crate::domain::{
    Advisory, FeatureResolution, FeatureVector, Language, NewHealthRecord, Questionnaire,
    RiskDecision, RiskPercent, RiskSource, ALERT_THRESHOLD,
};
use crate::ports::{ExtractionOutcome, ExtractionRequest, Storage, SymptomExtractor};
use crate::HealixError;

use super::alerts::AlertDispatcher;

/// A parsed `/predict` body.
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub resolution: FeatureResolution,
    pub message: String,
    pub questionnaire: Questionnaire,
    pub language: Language,
}

impl PredictionRequest {
    /// Parse a JSON body. Only the top-level shape is validated; every
    /// individual field falls back to a default.
    ///
    /// # Errors
    /// Returns `HealixError::Validation` if the body is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, HealixError> {
        let Value::Object(payload) = value else {
            return Err(HealixError::Validation(
                "request body must be a JSON object".to_string(),
            ));
        };
        Ok(Self::from_payload(&payload))
    }

    #[must_use]
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let language = payload
            .get("language")
            .and_then(Value::as_str)
            .map(Language::from_code)
            .unwrap_or_default();

        Self {
            resolution: FeatureResolution::resolve(payload),
            message,
            questionnaire: Questionnaire::from_value(payload.get("questionnaire")),
            language,
        }
    }
}

/// The `/predict` response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub diabetes: RiskPercent,
    pub heart: RiskPercent,
    pub kidney: RiskPercent,
    pub estimates: FeatureVector,
    #[serde(flatten)]
    pub advisory: Advisory,
    pub record_id: i64,
    pub source: RiskSource,
}

/// Service running one prediction end to end.
pub struct PredictionService<S>
where
    S: Storage,
{
    extractor: Arc<dyn SymptomExtractor>,
    models: Arc<RiskModels>,
    storage: Arc<S>,
    alerts: Arc<AlertDispatcher>,
}

impl<S> PredictionService<S>
where
    S: Storage,
    S::Error: Into<crate::adapters::StorageError>,
{
    pub fn new(
        extractor: Arc<dyn SymptomExtractor>,
        models: Arc<RiskModels>,
        storage: Arc<S>,
        alerts: Arc<AlertDispatcher>,
    ) -> Self {
        Self {
            extractor,
            models,
            storage,
            alerts,
        }
    }

    /// Run the pipeline for one request.
    ///
    /// `username` is the logged-in user, `None` for guests.
    ///
    /// # Errors
    /// Returns error only if the classifiers fail or the record cannot be stored.
    pub async fn predict(
        &self,
        request: PredictionRequest,
        username: Option<&str>,
    ) -> Result<PredictionResponse, HealixError> {
        let PredictionRequest {
            mut resolution,
            message,
            questionnaire,
            language,
        } = request;

        let mut advisory = language.default_advisory();
        let mut extracted = None;

        let extraction_request = ExtractionRequest {
            message: &message,
            questionnaire: &questionnaire,
            language,
        };
        if extraction_request.has_input() {
            match self.extractor.extract(&extraction_request).await {
                ExtractionOutcome::Extracted(extraction) => {
                    tracing::debug!("Extraction via {} succeeded", self.extractor.name());
                    resolution.adjust_for_symptoms(&extraction.symptoms);
                    advisory = extraction.advisory;
                    extracted = Some(extraction.risks);
                }
                ExtractionOutcome::Unavailable(reason) => {
                    tracing::warn!(
                        "Extraction via {} unavailable, using defaults: {}",
                        self.extractor.name(),
                        reason
                    );
                }
            }
        }

        let decision = RiskDecision::decide(resolution.has_manual(), extracted);
        let risks = match decision {
            RiskDecision::UseExtracted(triple) => triple,
            RiskDecision::RunClassifiers => self.models.predict(&resolution.features)?,
        };

        let record = self
            .storage
            .append_record(&NewHealthRecord::new(username, &message, risks))
            .map_err(HealixError::from_storage)?;
        tracing::info!(
            "Stored record {} ({:?}): diabetes {}, heart {}, kidney {}",
            record.id,
            decision.source(),
            risks.diabetes,
            risks.heart,
            risks.kidney
        );

        if let Some(username) = username {
            if risks.any_above(ALERT_THRESHOLD) {
                let phone = match self.storage.find_user(username) {
                    Ok(user) => user.and_then(|u| u.alert_phone().map(str::to_string)),
                    Err(e) => {
                        let e: crate::adapters::StorageError = e.into();
                        tracing::warn!("Could not load user for alerting: {}", e);
                        None
                    }
                };
                self.alerts
                    .notify(phone.as_deref(), &risks, record.id, language)
                    .await;
            }
        }

        Ok(PredictionResponse {
            diabetes: risks.diabetes,
            heart: risks.heart,
            kidney: risks.kidney,
            estimates: resolution.features,
            advisory,
            record_id: record.id,
            source: decision.source(),
        })
    }
}
