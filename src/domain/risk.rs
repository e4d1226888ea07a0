//! Risk percentages, advisory text, and the model-or-extraction decision.

use serde::{Deserialize, Serialize};

/// Percentage above which a result triggers an SMS alert.
pub const ALERT_THRESHOLD: u8 = 70;

/// An integer risk percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RiskPercent(u8);

impl RiskPercent {
    /// Round and clamp an arbitrary percentage value.
    #[must_use]
    pub fn from_percentage(value: f64) -> Self {
        if !value.is_finite() {
            return Self(0);
        }
        Self(value.round().clamp(0.0, 100.0) as u8)
    }

    /// Convert a positive-class probability into a percentage.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        Self::from_percentage(probability * 100.0)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for RiskPercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// The three screened conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Diabetes,
    Heart,
    Kidney,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Diabetes, Condition::Heart, Condition::Kidney];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes",
            Self::Heart => "Heart",
            Self::Kidney => "Kidney",
        }
    }
}

/// Risk percentages for all three conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RiskTriple {
    pub diabetes: RiskPercent,
    pub heart: RiskPercent,
    pub kidney: RiskPercent,
}

impl RiskTriple {
    #[must_use]
    pub fn new(diabetes: RiskPercent, heart: RiskPercent, kidney: RiskPercent) -> Self {
        Self {
            diabetes,
            heart,
            kidney,
        }
    }

    /// Build from already-integral percentages (clamped to 100).
    #[must_use]
    pub fn from_values(diabetes: u8, heart: u8, kidney: u8) -> Self {
        Self::new(
            RiskPercent::from_percentage(f64::from(diabetes)),
            RiskPercent::from_percentage(f64::from(heart)),
            RiskPercent::from_percentage(f64::from(kidney)),
        )
    }

    #[must_use]
    pub fn get(&self, condition: Condition) -> RiskPercent {
        match condition {
            Condition::Diabetes => self.diabetes,
            Condition::Heart => self.heart,
            Condition::Kidney => self.kidney,
        }
    }

    /// Conditions strictly above `threshold`, in fixed order.
    #[must_use]
    pub fn above(&self, threshold: u8) -> Vec<(Condition, RiskPercent)> {
        Condition::ALL
            .iter()
            .map(|c| (*c, self.get(*c)))
            .filter(|(_, r)| r.value() > threshold)
            .collect()
    }

    #[must_use]
    pub fn any_above(&self, threshold: u8) -> bool {
        !self.above(threshold).is_empty()
    }
}

/// Free-text guidance returned with every prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub recommendation: String,
    pub future_risks: String,
    pub precautions: String,
    pub causes: String,
    pub reduction_steps: String,
    pub diet_plan: String,
}

/// Where the final percentages came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSource {
    /// Taken verbatim from the extraction step.
    Extraction,
    /// Computed by the logistic classifiers.
    Classifier,
}

/// Outcome of the single branch point in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDecision {
    UseExtracted(RiskTriple),
    RunClassifiers,
}

impl RiskDecision {
    /// Extraction percentages win only when the caller gave no vitals.
    #[must_use]
    pub fn decide(has_manual: bool, extracted: Option<RiskTriple>) -> Self {
        match extracted {
            Some(triple) if !has_manual => Self::UseExtracted(triple),
            _ => Self::RunClassifiers,
        }
    }

    #[must_use]
    pub fn source(&self) -> RiskSource {
        match self {
            Self::UseExtracted(_) => RiskSource::Extraction,
            Self::RunClassifiers => RiskSource::Classifier,
        }
    }
}
