//! Chat-completions extractor (OpenAI-compatible API, JSON mode).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument};
use zeroize::Zeroizing;

use crate::domain::texts::{
    FALLBACK_CAUSES, FALLBACK_DIET_PLAN, FALLBACK_FUTURE_RISKS, FALLBACK_PRECAUTIONS,
    FALLBACK_RECOMMENDATION, FALLBACK_REDUCTION_STEPS,
};
use crate::domain::{parse_number, Advisory, RiskPercent, RiskTriple, Symptom, SymptomSet};
use crate::ports::{
    Extraction, ExtractionError, ExtractionOutcome, ExtractionRequest, SymptomExtractor,
};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

/// Live extractor calling `{base_url}/chat/completions`.
pub struct OpenAiExtractor {
    client: reqwest::Client,
    api_key: Zeroizing<String>,
    model: String,
    base_url: String,
}

impl OpenAiExtractor {
    /// Build an extractor with its own HTTP client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(api_key: Zeroizing<String>, timeout: Duration) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key))
    }

    /// Build an extractor sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: Zeroizing<String>) -> Self {
        Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[instrument(name = "openai_extract", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, ExtractionError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: json!({ "type": "json_object" }),
        };

        debug!("Sending chat completion request");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Chat completion API returned error response");
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ExtractionError::EmptyResponse)
    }
}

/// Prompt asking for every symptom flag, three risks, and six advisory fields.
#[must_use]
pub fn build_prompt(request: &ExtractionRequest<'_>) -> String {
    let language = request.language.display_name();
    let symptom_list = Symptom::ALL
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a health assistant for Indian conditions (urban and rural).\n\
         Extract 0 or 1 values for the symptoms below.\n\
         \n\
         CRITICAL: Provide ALL text-based fields (recommendation, future_risks, precautions, causes, reduction_steps, diet_plan) in {language}.\n\
         \n\
         Symptoms to extract: {symptom_list}.\n\
         \n\
         Fields to provide (in {language}):\n\
         1. 'recommendation': Risk-based advice (max 30 words).\n\
            - LOW risk: Focus on maintenance and preventive health.\n\
            - MODERATE risk: Focus on lifestyle changes and scheduling a checkup.\n\
            - HIGH risk: Urgent medical consultation.\n\
         2. 'future_risks': Potential complications (max 20 words).\n\
         3. 'precautions': Actionable steps (max 3 bullet points).\n\
         4. 'causes': Medical/lifestyle reasons (max 30 words).\n\
         5. 'reduction_steps': Steps to lower risk proportional to risk level.\n\
         6. 'diet_plan': Recommended foods (max 30 words).\n\
         7. 'diabetes_risk', 'heart_risk', 'kidney_risk': Percentages (0-100).\n\
         \n\
         Input Text: {message}\n\
         Direct Symptoms: {answers}\n\
         \n\
         Return JSON object with all symptoms and advice keys.",
        message = request.message,
        answers = request.questionnaire.as_prompt_text(),
    )
}

/// Strip a surrounding markdown code fence, if any.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(start) = rest.find('\n') {
            let body = &rest[start + 1..];
            if let Some(end) = body.rfind("```") {
                return body[..end].trim();
            }
        }
    }
    trimmed
}

fn text_field(object: &Map<String, Value>, key: &str, fallback: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => fallback.to_string(),
    }
}

fn risk_field(object: &Map<String, Value>, key: &str) -> RiskPercent {
    object
        .get(key)
        .and_then(parse_number)
        .map(RiskPercent::from_percentage)
        .unwrap_or_default()
}

/// Interpret the model's JSON reply.
///
/// Missing advisory fields fall back to fixed English texts; missing or
/// unparseable risks become 0.
///
/// # Errors
/// Returns `MalformedJson` if the content is not a JSON object.
pub fn parse_completion(content: &str) -> Result<Extraction, ExtractionError> {
    let value: Value = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| ExtractionError::MalformedJson(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ExtractionError::MalformedJson(
            "top-level value is not an object".to_string(),
        ));
    };

    let symptoms: SymptomSet = SymptomSet::from_json_object(&object);
    let risks = RiskTriple::new(
        risk_field(&object, "diabetes_risk"),
        risk_field(&object, "heart_risk"),
        risk_field(&object, "kidney_risk"),
    );
    let advisory = Advisory {
        recommendation: text_field(&object, "recommendation", FALLBACK_RECOMMENDATION),
        future_risks: text_field(&object, "future_risks", FALLBACK_FUTURE_RISKS),
        precautions: text_field(&object, "precautions", FALLBACK_PRECAUTIONS),
        causes: text_field(&object, "causes", FALLBACK_CAUSES),
        reduction_steps: text_field(&object, "reduction_steps", FALLBACK_REDUCTION_STEPS),
        diet_plan: text_field(&object, "diet_plan", FALLBACK_DIET_PLAN),
    };

    Ok(Extraction {
        symptoms,
        risks,
        advisory,
    })
}

#[async_trait]
impl SymptomExtractor for OpenAiExtractor {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn extract(&self, request: &ExtractionRequest<'_>) -> ExtractionOutcome {
        let prompt = build_prompt(request);
        let result = match self.complete(&prompt).await {
            Ok(content) => parse_completion(&content),
            Err(e) => Err(e),
        };
        if result.is_ok() {
            info!("Extraction completed via {}", self.model);
        }
        result.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Language, Questionnaire};

    #[test]
    fn test_prompt_carries_inputs_and_language() {
        let q = Questionnaire::from_value(Some(&json!({"thirst": 1, "fatigue": 0})));
        let request = ExtractionRequest {
            message: "always thirsty lately",
            questionnaire: &q,
            language: Language::TeIn,
        };
        let prompt = build_prompt(&request);

        assert!(prompt.contains("Input Text: always thirsty lately"));
        assert!(prompt.contains("Direct Symptoms: "));
        assert!(prompt.contains("thirst: Yes"));
        assert!(prompt.contains("fatigue: No"));
        assert!(prompt.contains("in Telugu"));
        assert!(prompt.contains("muscle_cramps"));
    }

    #[test]
    fn test_parse_full_response() {
        let content = json!({
            "thirst": 1,
            "chest_pain": 0,
            "palpitations": "1",
            "recommendation": "See a doctor.",
            "future_risks": "Neuropathy.",
            "precautions": ["Check sugar", "Walk daily"],
            "causes": "Diet.",
            "reduction_steps": "Cut sugar.",
            "diet_plan": "Millets.",
            "diabetes_risk": 82,
            "heart_risk": "35",
            "kidney_risk": 12.6
        })
        .to_string();

        let extraction = parse_completion(&content).expect("Should parse");
        assert_eq!(extraction.symptoms.get(Symptom::Thirst), Some(true));
        assert_eq!(extraction.symptoms.get(Symptom::ChestPain), Some(false));
        assert_eq!(extraction.symptoms.get(Symptom::Palpitations), Some(true));
        assert_eq!(extraction.symptoms.get(Symptom::Fatigue), None);
        assert_eq!(extraction.risks, RiskTriple::from_values(82, 35, 13));
        assert_eq!(extraction.advisory.precautions, "Check sugar\nWalk daily");
        assert_eq!(extraction.advisory.diet_plan, "Millets.");
    }

    #[test]
    fn test_parse_applies_fallbacks() {
        let extraction = parse_completion("{\"fatigue\": 1}").expect("Should parse");
        assert_eq!(extraction.risks, RiskTriple::default());
        assert_eq!(extraction.advisory.recommendation, FALLBACK_RECOMMENDATION);
        assert_eq!(extraction.advisory.causes, FALLBACK_CAUSES);
        assert_eq!(extraction.advisory.reduction_steps, FALLBACK_REDUCTION_STEPS);
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let content = "```json\n{\"heart_risk\": 91}\n```";
        let extraction = parse_completion(content).expect("Should parse");
        assert_eq!(extraction.risks.heart.value(), 91);
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(
            parse_completion("[1, 2]"),
            Err(ExtractionError::MalformedJson(_))
        ));
        assert!(matches!(
            parse_completion("not json"),
            Err(ExtractionError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let extractor = OpenAiExtractor::with_client(
            reqwest::Client::new(),
            Zeroizing::new("sk-test".to_string()),
        )
        .base_url("http://localhost:8080/v1/");
        assert_eq!(extractor.base_url, "http://localhost:8080/v1");
        assert_eq!(extractor.name(), "openai");
    }

    /// Local chat-completions endpoint answering every call with `status` and `body`.
    async fn serve_canned(status: axum::http::StatusCode, body: Value) -> String {
        let app = axum::Router::new().route(
            "/chat/completions",
            axum::routing::post(move || async move { (status, axum::Json(body)) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Should bind");
        let addr = listener.local_addr().expect("Should have address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Should serve");
        });
        format!("http://{addr}")
    }

    fn extractor_for(base_url: &str) -> OpenAiExtractor {
        OpenAiExtractor::new(Zeroizing::new("sk-test".to_string()), Duration::from_secs(5))
            .expect("Should build client")
            .base_url(base_url)
    }

    async fn run(extractor: &OpenAiExtractor) -> ExtractionOutcome {
        let questionnaire = Questionnaire::default();
        let request = ExtractionRequest {
            message: "thirsty all week and tired",
            questionnaire: &questionnaire,
            language: Language::EnUs,
        };
        extractor.extract(&request).await
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let base = serve_canned(
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "rate limited"}}),
        )
        .await;
        match run(&extractor_for(&base)).await {
            ExtractionOutcome::Unavailable(reason) => assert!(reason.contains("429"), "{reason}"),
            other => panic!("Expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_unavailable() {
        let base = serve_canned(axum::http::StatusCode::OK, json!({"choices": []})).await;
        assert_eq!(
            run(&extractor_for(&base)).await,
            ExtractionOutcome::Unavailable(ExtractionError::EmptyResponse.to_string())
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let outcome = run(&extractor_for("http://127.0.0.1:9/v1")).await;
        assert!(matches!(outcome, ExtractionOutcome::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_live_response_is_extracted() {
        let content = json!({"diabetes_risk": 77, "thirst": 1}).to_string();
        let base = serve_canned(
            axum::http::StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": content}}]}),
        )
        .await;
        match run(&extractor_for(&base)).await {
            ExtractionOutcome::Extracted(extraction) => {
                assert_eq!(extraction.risks.diabetes.value(), 77);
                assert!(extraction.symptoms.is_set(Symptom::Thirst));
            }
            other => panic!("Expected Extracted, got {other:?}"),
        }
    }
}
