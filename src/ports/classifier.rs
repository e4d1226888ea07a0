//! Classifier port: a binary model producing a positive-class probability.

use crate::domain::{FeatureVector, Vital};

/// Errors from model loading or evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model format error: {0}")]
    Format(String),

    #[error("Model integrity check failed: {0}")]
    Integrity(String),

    #[error("Feature count mismatch: got {got}, expected {expected}")]
    FeatureCount { got: usize, expected: usize },
}

/// A pre-trained binary classifier over a fixed subset of vitals.
pub trait RiskClassifier: Send + Sync {
    /// Vitals consumed, in model input order.
    fn inputs(&self) -> &[Vital];

    /// Positive-class probability for raw inputs in `inputs()` order.
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` if `row` has the wrong length.
    fn predict_proba(&self, row: &[f64]) -> Result<f64, ModelError>;

    /// Convenience: select inputs from a feature vector and evaluate.
    ///
    /// # Errors
    /// Propagates evaluation errors.
    fn predict_features(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.predict_proba(&features.select(self.inputs()))
    }
}
