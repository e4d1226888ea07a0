//! Logistic-regression classifiers loaded from exported JSON parameters.
//!
//! Each model file carries feature names, coefficients, intercept and the
//! standard-scaler statistics it was trained with:
//!
//! ```text
//! p = sigmoid(intercept + Σ coef[i] * (x[i] - mean[i]) / scale[i])
//! ```
//!
//! # Integrity
//!
//! If `manifest.json` sits next to the model files, every file it lists must
//! match its SHA-256 digest and every loaded model must be listed. Without a
//! manifest the files are loaded as-is (a warning is logged).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{Condition, FeatureVector, RiskPercent, RiskTriple, Vital};
use crate::ports::{ModelError, RiskClassifier};

pub const MANIFEST_FILE: &str = "manifest.json";

const DIABETES_INPUTS: [Vital; 4] = [Vital::Age, Vital::Bmi, Vital::Bp, Vital::Glucose];
const HEART_INPUTS: [Vital; 4] = [Vital::Age, Vital::Bp, Vital::Chol, Vital::MaxHeartRate];
const KIDNEY_INPUTS: [Vital; 4] = [Vital::Age, Vital::Bp, Vital::Glucose, Vital::Chol];

/// Model parameters as exported to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedLogisticModel {
    pub name: String,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelManifest {
    version: u32,
    files: BTreeMap<String, String>,
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// A validated logistic model bound to its input vitals.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    params: ExportedLogisticModel,
    inputs: Vec<Vital>,
}

impl LogisticModel {
    /// Validate exported parameters against the vitals this model must consume.
    ///
    /// # Errors
    /// Returns `ModelError::Format` on mismatched names, lengths or a zero scale.
    pub fn new(params: ExportedLogisticModel, inputs: &[Vital]) -> Result<Self, ModelError> {
        let expected: Vec<&str> = inputs.iter().map(|v| v.key()).collect();
        if params.feature_names != expected {
            return Err(ModelError::Format(format!(
                "{}: feature_names {:?} do not match required inputs {:?}",
                params.name, params.feature_names, expected
            )));
        }

        let n = inputs.len();
        if params.coefficients.len() != n
            || params.scaler_mean.len() != n
            || params.scaler_scale.len() != n
        {
            return Err(ModelError::Format(format!(
                "{}: parameter lengths do not match feature_names length",
                params.name
            )));
        }
        if params.scaler_scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ModelError::Format(format!(
                "{}: scaler_scale must be finite and non-zero",
                params.name
            )));
        }

        Ok(Self {
            params,
            inputs: inputs.to_vec(),
        })
    }

    #[must_use]
    pub fn params(&self) -> &ExportedLogisticModel {
        &self.params
    }
}

impl RiskClassifier for LogisticModel {
    fn inputs(&self) -> &[Vital] {
        &self.inputs
    }

    fn predict_proba(&self, row: &[f64]) -> Result<f64, ModelError> {
        let p = &self.params;
        if row.len() != p.coefficients.len() {
            return Err(ModelError::FeatureCount {
                got: row.len(),
                expected: p.coefficients.len(),
            });
        }

        let z = row
            .iter()
            .zip(&p.coefficients)
            .zip(p.scaler_mean.iter().zip(&p.scaler_scale))
            .fold(p.intercept, |acc, ((x, coef), (mean, scale))| {
                acc + coef * (x - mean) / scale
            });

        Ok(sigmoid(z))
    }
}

/// The three condition classifiers.
#[derive(Debug, Clone)]
pub struct RiskModels {
    diabetes: LogisticModel,
    heart: LogisticModel,
    kidney: LogisticModel,
}

impl RiskModels {
    /// File name for a condition's parameters.
    #[must_use]
    pub fn file_name(condition: Condition) -> &'static str {
        match condition {
            Condition::Diabetes => "diabetes_model.json",
            Condition::Heart => "heart_model.json",
            Condition::Kidney => "kidney_model.json",
        }
    }

    fn inputs_for(condition: Condition) -> &'static [Vital] {
        match condition {
            Condition::Diabetes => &DIABETES_INPUTS,
            Condition::Heart => &HEART_INPUTS,
            Condition::Kidney => &KIDNEY_INPUTS,
        }
    }

    /// Reference parameters shipped with the service.
    ///
    /// # Errors
    /// Never fails for the shipped constants; the `Result` mirrors `new`.
    pub fn builtin() -> Result<Self, ModelError> {
        let make = |condition: Condition,
                    coefficients: [f64; 4],
                    intercept: f64,
                    scaler_mean: [f64; 4],
                    scaler_scale: [f64; 4]| {
            let inputs = Self::inputs_for(condition);
            LogisticModel::new(
                ExportedLogisticModel {
                    name: condition.label().to_lowercase(),
                    feature_names: inputs.iter().map(|v| v.key().to_string()).collect(),
                    coefficients: coefficients.to_vec(),
                    intercept,
                    scaler_mean: scaler_mean.to_vec(),
                    scaler_scale: scaler_scale.to_vec(),
                },
                inputs,
            )
        };

        Ok(Self {
            diabetes: make(
                Condition::Diabetes,
                [0.6, 0.7, 0.3, 1.4],
                -1.2,
                [45.0, 25.0, 120.0, 100.0],
                [15.0, 5.0, 15.0, 25.0],
            )?,
            heart: make(
                Condition::Heart,
                [0.8, 0.6, 0.7, 0.4],
                -1.3,
                [45.0, 120.0, 180.0, 150.0],
                [15.0, 15.0, 35.0, 20.0],
            )?,
            kidney: make(
                Condition::Kidney,
                [0.7, 0.8, 0.6, 0.3],
                -1.6,
                [45.0, 120.0, 100.0, 180.0],
                [15.0, 15.0, 25.0, 35.0],
            )?,
        })
    }

    /// Load all three models from a directory, verifying the manifest if present.
    ///
    /// # Errors
    /// Returns error if a file is missing, malformed, or fails its hash check.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let manifest = Self::read_manifest(model_dir)?;
        if manifest.is_none() {
            tracing::warn!(
                "No {} in {:?}; loading model files without integrity check",
                MANIFEST_FILE,
                model_dir
            );
        }

        let load_one = |condition: Condition| -> Result<LogisticModel, ModelError> {
            let file = Self::file_name(condition);
            let bytes = fs::read(model_dir.join(file))?;

            if let Some(manifest) = &manifest {
                let expected = manifest.files.get(file).ok_or_else(|| {
                    ModelError::Integrity(format!("{file} is not listed in {MANIFEST_FILE}"))
                })?;
                if !sha256_hex(&bytes).eq_ignore_ascii_case(expected) {
                    return Err(ModelError::Integrity(format!("hash mismatch for {file}")));
                }
            }

            let params: ExportedLogisticModel = serde_json::from_slice(&bytes)
                .map_err(|e| ModelError::Format(format!("{file}: {e}")))?;
            LogisticModel::new(params, Self::inputs_for(condition))
        };

        let models = Self {
            diabetes: load_one(Condition::Diabetes)?,
            heart: load_one(Condition::Heart)?,
            kidney: load_one(Condition::Kidney)?,
        };

        tracing::info!("Loaded risk models from {:?}", model_dir);
        Ok(models)
    }

    fn read_manifest(model_dir: &Path) -> Result<Option<ModelManifest>, ModelError> {
        let path = model_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read(&path)?;
        let manifest: ModelManifest = serde_json::from_slice(&content)
            .map_err(|e| ModelError::Format(format!("Invalid {MANIFEST_FILE}: {e}")))?;
        if manifest.version != 1 {
            return Err(ModelError::Format(format!(
                "Unsupported manifest version: {}",
                manifest.version
            )));
        }
        Ok(Some(manifest))
    }

    /// Write all three parameter files plus a manifest binding their hashes.
    ///
    /// # Errors
    /// Returns error if a file cannot be written.
    pub fn export(&self, model_dir: &Path) -> Result<(), ModelError> {
        fs::create_dir_all(model_dir)?;

        let mut files = BTreeMap::new();
        for condition in Condition::ALL {
            let file = Self::file_name(condition);
            let bytes = serde_json::to_vec_pretty(self.model(condition).params())
                .map_err(|e| ModelError::Format(e.to_string()))?;
            fs::write(model_dir.join(file), &bytes)?;
            files.insert(file.to_string(), sha256_hex(&bytes));
        }

        let manifest = ModelManifest { version: 1, files };
        let bytes =
            serde_json::to_vec_pretty(&manifest).map_err(|e| ModelError::Format(e.to_string()))?;
        fs::write(model_dir.join(MANIFEST_FILE), bytes)?;
        Ok(())
    }

    #[must_use]
    pub fn model(&self, condition: Condition) -> &LogisticModel {
        match condition {
            Condition::Diabetes => &self.diabetes,
            Condition::Heart => &self.heart,
            Condition::Kidney => &self.kidney,
        }
    }

    /// Raw positive-class probabilities, in diabetes/heart/kidney order.
    ///
    /// # Errors
    /// Propagates model evaluation errors.
    pub fn probabilities(&self, features: &FeatureVector) -> Result<[f64; 3], ModelError> {
        Ok([
            self.diabetes.predict_features(features)?,
            self.heart.predict_features(features)?,
            self.kidney.predict_features(features)?,
        ])
    }

    /// Percentages: `round(probability * 100)` per condition.
    ///
    /// # Errors
    /// Propagates model evaluation errors.
    pub fn predict(&self, features: &FeatureVector) -> Result<RiskTriple, ModelError> {
        let [d, h, k] = self.probabilities(features)?;
        Ok(RiskTriple::new(
            RiskPercent::from_probability(d),
            RiskPercent::from_probability(h),
            RiskPercent::from_probability(k),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults_are_low_risk() {
        let models = RiskModels::builtin().expect("Should build");
        let risks = models.predict(&FeatureVector::default()).expect("Should predict");

        // At the scaler means only the intercept contributes.
        assert_eq!(risks.diabetes, RiskPercent::from_probability(sigmoid(-1.2)));
        assert!(risks.heart.value() < 30);
        assert!(risks.kidney.value() < 30);
    }

    #[test]
    fn test_high_glucose_raises_diabetes_risk() {
        let models = RiskModels::builtin().expect("Should build");
        let high = FeatureVector {
            glucose: 200.0,
            ..FeatureVector::default()
        };
        let base = models.predict(&FeatureVector::default()).expect("Should predict");
        let risks = models.predict(&high).expect("Should predict");
        assert!(risks.diabetes > base.diabetes);
        assert!(risks.diabetes.value() > 90);
        // heart model does not consume glucose
        assert_eq!(risks.heart, base.heart);
    }

    #[test]
    fn test_wrong_row_length_is_rejected() {
        let models = RiskModels::builtin().expect("Should build");
        let result = models.model(Condition::Heart).predict_proba(&[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ModelError::FeatureCount { got: 2, expected: 4 })
        ));
    }

    #[test]
    fn test_feature_name_mismatch_is_rejected() {
        let models = RiskModels::builtin().expect("Should build");
        let mut params = models.model(Condition::Diabetes).params().clone();
        params.feature_names.swap(0, 1);
        assert!(LogisticModel::new(params, &DIABETES_INPUTS).is_err());
    }

    #[test]
    fn test_export_then_load_verifies_manifest() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let models = RiskModels::builtin().expect("Should build");
        models.export(dir.path()).expect("Should export");

        let loaded = RiskModels::load(dir.path()).expect("Should load");
        let features = FeatureVector {
            age: 63.0,
            bp: 150.0,
            ..FeatureVector::default()
        };
        assert_eq!(
            loaded.predict(&features).expect("Should predict"),
            models.predict(&features).expect("Should predict")
        );

        // Tamper with one file after the manifest was written.
        let path = dir.path().join(RiskModels::file_name(Condition::Kidney));
        let mut content = fs::read_to_string(&path).expect("Should read");
        content = content.replace("-1.6", "-0.6");
        fs::write(&path, content).expect("Should write");

        assert!(matches!(
            RiskModels::load(dir.path()),
            Err(ModelError::Integrity(_))
        ));
    }

    #[test]
    fn test_load_without_manifest() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        RiskModels::builtin()
            .expect("Should build")
            .export(dir.path())
            .expect("Should export");
        fs::remove_file(dir.path().join(MANIFEST_FILE)).expect("Should remove");

        assert!(RiskModels::load(dir.path()).is_ok());
    }

    #[test]
    fn test_shipped_models_match_builtin() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let shipped = RiskModels::load(&dir).expect("Should load shipped models");
        let builtin = RiskModels::builtin().expect("Should build");

        for condition in Condition::ALL {
            assert_eq!(
                shipped.model(condition).params(),
                builtin.model(condition).params()
            );
        }
    }
}
