//! Vital-sign feature vector consumed by the risk classifiers.
//!
//! Callers may supply any subset of the six vitals, as numbers or numeric
//! strings. Missing or unparseable values fall back to population-average
//! defaults; self-reported symptoms can then nudge the untouched ones.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::symptoms::{Symptom, SymptomSet};

/// One of the six vitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vital {
    Age,
    Bmi,
    Bp,
    Glucose,
    Chol,
    MaxHeartRate,
}

impl Vital {
    pub const ALL: [Vital; 6] = [
        Vital::Age,
        Vital::Bmi,
        Vital::Bp,
        Vital::Glucose,
        Vital::Chol,
        Vital::MaxHeartRate,
    ];

    /// Request/response key.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Bmi => "bmi",
            Self::Bp => "bp",
            Self::Glucose => "glucose",
            Self::Chol => "chol",
            Self::MaxHeartRate => "max_heart_rate",
        }
    }

    /// Average healthy adult value used when the caller gives none.
    #[must_use]
    pub fn default_value(self) -> f64 {
        match self {
            Self::Age => 45.0,
            Self::Bmi => 25.0,
            Self::Bp => 120.0,
            Self::Glucose => 100.0,
            Self::Chol => 180.0,
            Self::MaxHeartRate => 150.0,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Age => 0,
            Self::Bmi => 1,
            Self::Bp => 2,
            Self::Glucose => 3,
            Self::Chol => 4,
            Self::MaxHeartRate => 5,
        }
    }
}

/// Symptom-driven increments applied to vitals the caller did not supply.
const SYMPTOM_ADJUSTMENTS: [(Vital, Symptom, f64); 10] = [
    (Vital::Glucose, Symptom::Thirst, 20.0),
    (Vital::Glucose, Symptom::Urination, 20.0),
    (Vital::Glucose, Symptom::BlurredVision, 20.0),
    (Vital::Glucose, Symptom::SlowHealing, 20.0),
    (Vital::Bp, Symptom::BreathShortness, 10.0),
    (Vital::Bp, Symptom::SwollenLegs, 10.0),
    (Vital::MaxHeartRate, Symptom::ChestPain, 30.0),
    (Vital::MaxHeartRate, Symptom::Palpitations, 30.0),
    (Vital::MaxHeartRate, Symptom::BreathShortness, 20.0),
    (Vital::Bmi, Symptom::Obesity, 10.0),
];

/// The six numeric vitals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Age in years
    pub age: f64,
    /// Body-mass index in kg/m²
    pub bmi: f64,
    /// Systolic blood pressure in mmHg
    pub bp: f64,
    /// Fasting glucose in mg/dL
    pub glucose: f64,
    /// Total cholesterol in mg/dL
    pub chol: f64,
    /// Maximum heart rate in bpm
    pub max_heart_rate: f64,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            age: Vital::Age.default_value(),
            bmi: Vital::Bmi.default_value(),
            bp: Vital::Bp.default_value(),
            glucose: Vital::Glucose.default_value(),
            chol: Vital::Chol.default_value(),
            max_heart_rate: Vital::MaxHeartRate.default_value(),
        }
    }
}

impl FeatureVector {
    #[must_use]
    pub fn get(&self, vital: Vital) -> f64 {
        match vital {
            Vital::Age => self.age,
            Vital::Bmi => self.bmi,
            Vital::Bp => self.bp,
            Vital::Glucose => self.glucose,
            Vital::Chol => self.chol,
            Vital::MaxHeartRate => self.max_heart_rate,
        }
    }

    fn slot(&mut self, vital: Vital) -> &mut f64 {
        match vital {
            Vital::Age => &mut self.age,
            Vital::Bmi => &mut self.bmi,
            Vital::Bp => &mut self.bp,
            Vital::Glucose => &mut self.glucose,
            Vital::Chol => &mut self.chol,
            Vital::MaxHeartRate => &mut self.max_heart_rate,
        }
    }

    /// Select the given vitals, in order, for a classifier.
    #[must_use]
    pub fn select(&self, vitals: &[Vital]) -> Vec<f64> {
        vitals.iter().map(|v| self.get(*v)).collect()
    }
}

/// Python-style truthiness of a request value.
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Parse a request value as a finite number.
#[must_use]
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(true) => Some(1.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Feature vector plus which vitals the caller explicitly supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureResolution {
    pub features: FeatureVector,
    supplied: [bool; 6],
}

impl FeatureResolution {
    /// Resolve the six vitals from a raw request object.
    ///
    /// A vital counts as supplied when its key is present with a truthy value,
    /// whether or not it then parses.
    #[must_use]
    pub fn resolve(payload: &Map<String, Value>) -> Self {
        let mut features = FeatureVector::default();
        let mut supplied = [false; 6];

        for vital in Vital::ALL {
            let Some(value) = payload.get(vital.key()).filter(|v| is_truthy(v)) else {
                continue;
            };
            supplied[vital.index()] = true;
            match parse_number(value) {
                Some(number) => *features.slot(vital) = number,
                None => tracing::debug!("Ignoring non-numeric value for {}", vital.key()),
            }
        }

        Self { features, supplied }
    }

    /// Whether the caller explicitly supplied any vital.
    #[must_use]
    pub fn has_manual(&self) -> bool {
        self.supplied.iter().any(|s| *s)
    }

    #[must_use]
    pub fn was_supplied(&self, vital: Vital) -> bool {
        self.supplied[vital.index()]
    }

    /// Raise vitals the caller left blank according to reported symptoms.
    pub fn adjust_for_symptoms(&mut self, symptoms: &SymptomSet) {
        for (vital, symptom, increment) in SYMPTOM_ADJUSTMENTS {
            if !self.was_supplied(vital) && symptoms.is_set(symptom) {
                *self.features.slot(vital) += increment;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let resolved = FeatureResolution::resolve(&Map::new());
        assert_eq!(resolved.features, FeatureVector::default());
        assert!(!resolved.has_manual());
        assert!((resolved.features.max_heart_rate - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_numeric_and_string_overrides() {
        let resolved = FeatureResolution::resolve(&payload(json!({
            "age": 61,
            "glucose": " 142.5 ",
        })));
        assert!((resolved.features.age - 61.0).abs() < f64::EPSILON);
        assert!((resolved.features.glucose - 142.5).abs() < f64::EPSILON);
        assert!((resolved.features.bmi - 25.0).abs() < f64::EPSILON);
        assert!(resolved.has_manual());
    }

    #[test]
    fn test_unparseable_value_defaults_but_counts_as_manual() {
        let resolved = FeatureResolution::resolve(&payload(json!({"bp": "high"})));
        assert!((resolved.features.bp - 120.0).abs() < f64::EPSILON);
        assert!(resolved.has_manual());
        assert!(resolved.was_supplied(Vital::Bp));
    }

    #[test]
    fn test_falsy_values_are_not_manual() {
        let resolved = FeatureResolution::resolve(&payload(json!({
            "age": 0,
            "bmi": "",
            "bp": null,
            "glucose": false,
        })));
        assert!(!resolved.has_manual());
        assert!((resolved.features.age - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_finite_strings_are_rejected() {
        assert_eq!(parse_number(&json!("inf")), None);
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!("12")), Some(12.0));
    }

    #[test]
    fn test_symptom_adjustment_skips_supplied_vitals() {
        let mut resolved = FeatureResolution::resolve(&payload(json!({"glucose": 90})));
        let symptoms = SymptomSet::new()
            .with(Symptom::Thirst, true)
            .with(Symptom::Urination, true)
            .with(Symptom::BreathShortness, true)
            .with(Symptom::ChestPain, true)
            .with(Symptom::Obesity, true);

        resolved.adjust_for_symptoms(&symptoms);

        // glucose was supplied, so untouched
        assert!((resolved.features.glucose - 90.0).abs() < f64::EPSILON);
        assert!((resolved.features.bp - 130.0).abs() < f64::EPSILON);
        assert!((resolved.features.max_heart_rate - 200.0).abs() < f64::EPSILON);
        assert!((resolved.features.bmi - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_select_preserves_order() {
        let features = FeatureVector::default();
        let selected = features.select(&[Vital::Chol, Vital::Age]);
        assert_eq!(selected, vec![180.0, 45.0]);
    }
}
