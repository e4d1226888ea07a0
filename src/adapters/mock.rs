//! Offline extractor used when no language-model key is configured.
//!
//! Symptoms answered in the questionnaire are kept; the rest are drawn at
//! random. Risks follow `thirst` and `chest_pain` so the demo output is at
//! least directionally consistent with the answers.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::domain::texts::{MOCK_CAUSES, MOCK_DIET_PLAN, MOCK_FUTURE_RISKS, MOCK_PRECAUTIONS};
use crate::domain::{AdviceBand, Advisory, RiskTriple, Symptom, SymptomSet};
use crate::ports::{Extraction, ExtractionOutcome, ExtractionRequest, SymptomExtractor};

/// Any drawn risk above this picks the "high" advice bundle.
const HIGH_ADVICE_ABOVE: u8 = 60;

/// Random-but-plausible extractor backed by a ChaCha20 stream.
pub struct MockExtractor {
    rng: Mutex<ChaCha20Rng>,
}

impl MockExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }

    /// Deterministic stream for tests.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    fn generate(&self, request: &ExtractionRequest<'_>) -> Extraction {
        let answered = request.questionnaire.symptoms();
        let mut rng = self.rng.lock().expect("Lock failed");

        let mut symptoms = SymptomSet::new();
        for symptom in Symptom::ALL {
            let present = match answered.get(symptom) {
                Some(value) => value,
                None => rng.gen_bool(0.5),
            };
            symptoms.insert(symptom, present);
        }

        let mut elevated_if = |flag: bool| -> u8 {
            if flag {
                rng.gen_range(60..=95)
            } else {
                rng.gen_range(5..=30)
            }
        };
        let diabetes = elevated_if(symptoms.is_set(Symptom::Thirst));
        let heart = elevated_if(symptoms.is_set(Symptom::ChestPain));
        let kidney = rng.gen_range(5..=40);
        let risks = RiskTriple::from_values(diabetes, heart, kidney);

        let band = if risks.any_above(HIGH_ADVICE_ABOVE) {
            AdviceBand::High
        } else {
            AdviceBand::Low
        };
        let (recommendation, reduction_steps) = request.language.mock_advice(band);

        Extraction {
            symptoms,
            risks,
            advisory: Advisory {
                recommendation: recommendation.to_string(),
                future_risks: MOCK_FUTURE_RISKS.to_string(),
                precautions: MOCK_PRECAUTIONS.to_string(),
                causes: MOCK_CAUSES.to_string(),
                reduction_steps: reduction_steps.to_string(),
                diet_plan: MOCK_DIET_PLAN.to_string(),
            },
        }
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SymptomExtractor for MockExtractor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn extract(&self, request: &ExtractionRequest<'_>) -> ExtractionOutcome {
        let extraction = self.generate(request);
        tracing::debug!(
            "Mock extraction: {} symptoms present",
            extraction.symptoms.iter().filter(|(_, v)| *v).count()
        );
        ExtractionOutcome::Extracted(extraction)
    }
}
