//! Self-reported symptom vocabulary.
//!
//! Symptoms arrive either as structured questionnaire answers or are inferred
//! by an extraction step from free text. Both end up as a [`SymptomSet`].

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Boolean symptom indicators understood by the risk pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symptom {
    Thirst,
    Urination,
    Fatigue,
    ChestPain,
    Dizziness,
    Obesity,
    BlurredVision,
    SlowHealing,
    Numbness,
    BreathShortness,
    SwollenLegs,
    Palpitations,
    FoamyUrine,
    ItchySkin,
    MuscleCramps,
}

impl Symptom {
    /// Every symptom, in prompt order.
    pub const ALL: [Symptom; 15] = [
        Symptom::Thirst,
        Symptom::Urination,
        Symptom::Fatigue,
        Symptom::ChestPain,
        Symptom::Dizziness,
        Symptom::Obesity,
        Symptom::BlurredVision,
        Symptom::SlowHealing,
        Symptom::Numbness,
        Symptom::BreathShortness,
        Symptom::SwollenLegs,
        Symptom::Palpitations,
        Symptom::FoamyUrine,
        Symptom::ItchySkin,
        Symptom::MuscleCramps,
    ];

    /// Wire name used in questionnaires and model output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Thirst => "thirst",
            Self::Urination => "urination",
            Self::Fatigue => "fatigue",
            Self::ChestPain => "chest_pain",
            Self::Dizziness => "dizziness",
            Self::Obesity => "obesity",
            Self::BlurredVision => "blurred_vision",
            Self::SlowHealing => "slow_healing",
            Self::Numbness => "numbness",
            Self::BreathShortness => "breath_shortness",
            Self::SwollenLegs => "swollen_legs",
            Self::Palpitations => "palpitations",
            Self::FoamyUrine => "foamy_urine",
            Self::ItchySkin => "itchy_skin",
            Self::MuscleCramps => "muscle_cramps",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl std::fmt::Display for Symptom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Interpret a loosely-typed answer as yes/no.
///
/// Accepts `1`, `true`, and the strings `"1"`, `"yes"`, `"true"` as yes.
#[must_use]
pub fn answer_is_yes(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v == 1.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "yes" | "true"
        ),
        _ => false,
    }
}

/// Known symptom values, keyed by symptom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomSet {
    values: BTreeMap<Symptom, bool>,
}

impl SymptomSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symptom: Symptom, present: bool) {
        self.values.insert(symptom, present);
    }

    #[must_use]
    pub fn with(mut self, symptom: Symptom, present: bool) -> Self {
        self.insert(symptom, present);
        self
    }

    /// The recorded value, if this symptom was answered at all.
    #[must_use]
    pub fn get(&self, symptom: Symptom) -> Option<bool> {
        self.values.get(&symptom).copied()
    }

    /// True only when the symptom is recorded as present.
    #[must_use]
    pub fn is_set(&self, symptom: Symptom) -> bool {
        self.get(symptom).unwrap_or(false)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symptom, bool)> + '_ {
        self.values.iter().map(|(s, v)| (*s, *v))
    }

    /// Read every vocabulary key from a JSON object, ignoring unknown keys.
    #[must_use]
    pub fn from_json_object(object: &serde_json::Map<String, Value>) -> Self {
        let mut set = Self::new();
        for symptom in Symptom::ALL {
            if let Some(value) = object.get(symptom.name()) {
                set.insert(symptom, answer_is_yes(value));
            }
        }
        set
    }
}

impl Serialize for SymptomSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (symptom, present) in &self.values {
            map.serialize_entry(symptom.name(), &u8::from(*present))?;
        }
        map.end()
    }
}

/// Structured yes/no answers as submitted by the caller.
///
/// Keys outside the symptom vocabulary are kept so they still reach the
/// extraction prompt, but only vocabulary keys become a [`SymptomSet`].
#[derive(Debug, Clone, Default)]
pub struct Questionnaire {
    answers: Vec<(String, bool)>,
}

impl Questionnaire {
    /// Parse the `questionnaire` request field. Anything but an object is empty.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        let answers = match value {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| (k.clone(), answer_is_yes(v)))
                .collect(),
            _ => Vec::new(),
        };
        Self { answers }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Answers restricted to the symptom vocabulary.
    #[must_use]
    pub fn symptoms(&self) -> SymptomSet {
        let mut set = SymptomSet::new();
        for (name, yes) in &self.answers {
            if let Some(symptom) = Symptom::from_name(name) {
                set.insert(symptom, *yes);
            }
        }
        set
    }

    /// `name: Yes, other: No` listing used in the extraction prompt.
    #[must_use]
    pub fn as_prompt_text(&self) -> String {
        self.answers
            .iter()
            .map(|(name, yes)| format!("{name}: {}", if *yes { "Yes" } else { "No" }))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_roundtrip() {
        for symptom in Symptom::ALL {
            assert_eq!(Symptom::from_name(symptom.name()), Some(symptom));
        }
        assert_eq!(Symptom::from_name("headache"), None);
    }

    #[test]
    fn test_answer_parsing() {
        assert!(answer_is_yes(&json!(1)));
        assert!(answer_is_yes(&json!(true)));
        assert!(answer_is_yes(&json!(" Yes ")));
        assert!(!answer_is_yes(&json!(0)));
        assert!(!answer_is_yes(&json!("no")));
        assert!(!answer_is_yes(&json!(null)));
    }

    #[test]
    fn test_questionnaire_keeps_unknown_keys_for_prompt() {
        let q = Questionnaire::from_value(Some(&json!({"thirst": 1, "headache": 0})));
        assert!(!q.is_empty());
        assert_eq!(q.symptoms().len(), 1);
        assert!(q.symptoms().is_set(Symptom::Thirst));
        assert!(q.as_prompt_text().contains("headache: No"));
        assert!(q.as_prompt_text().contains("thirst: Yes"));
    }

    #[test]
    fn test_non_object_questionnaire_is_empty() {
        assert!(Questionnaire::from_value(Some(&json!([1, 2]))).is_empty());
        assert!(Questionnaire::from_value(None).is_empty());
    }

    #[test]
    fn test_symptom_set_serializes_as_flags() {
        let set = SymptomSet::new()
            .with(Symptom::ChestPain, true)
            .with(Symptom::Thirst, false);
        let value = serde_json::to_value(&set).expect("Should serialize");
        assert_eq!(value, json!({"thirst": 0, "chest_pain": 1}));
    }
}
