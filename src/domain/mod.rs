//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O. Everything here is deterministic and unit-tested
//! in place; the adapters and services build on top of it.

mod features;
mod language;
pub mod password;
mod record;
mod risk;
mod symptoms;

pub use features::{is_truthy, parse_number, FeatureResolution, FeatureVector, Vital};
pub use language::{AdviceBand, Language};
pub use record::{
    HealthRecord, NewHealthRecord, NewUser, User, UserUpdate, GUEST_USERNAME,
    QUESTIONNAIRE_PLACEHOLDER,
};
pub use risk::{
    Advisory, Condition, RiskDecision, RiskPercent, RiskSource, RiskTriple, ALERT_THRESHOLD,
};
pub use symptoms::{answer_is_yes, Questionnaire, Symptom, SymptomSet};

/// Re-exported text constants used by extraction adapters.
pub mod texts {
    pub use super::language::{
        FALLBACK_CAUSES, FALLBACK_DIET_PLAN, FALLBACK_FUTURE_RISKS, FALLBACK_PRECAUTIONS,
        FALLBACK_RECOMMENDATION, FALLBACK_REDUCTION_STEPS, MOCK_CAUSES, MOCK_DIET_PLAN,
        MOCK_FUTURE_RISKS, MOCK_PRECAUTIONS,
    };
}
