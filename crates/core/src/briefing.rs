//! # Briefing Generator
//!
//! Builds the meeting prompt and asks the hosted summarization model for a
//! briefing. Exactly one model call per briefing; any failure produces
//! [`Briefing::Unavailable`] instead of an error.

use serde::{Deserialize, Serialize};

use crate::config::CatalystConfig;
use crate::error::{ensure_success, read_json, CatalystError};
use crate::models::{Briefing, ContextDocument};

const SERVICE: &str = "Hugging Face";
/// Cap on generated tokens per briefing
pub const MAX_NEW_TOKENS: u32 = 300;
const CONTEXT_SEPARATOR: &str = "\n---\n";

#[derive(Clone)]
pub struct BriefingGenerator {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

impl BriefingGenerator {
    pub fn new(config: &CatalystConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            url: format!("{}/models/{}", config.endpoints.huggingface, config.hf_model),
            api_key: config.hf_api_key.clone(),
        }
    }

    /// Summarize the meeting context into a briefing
    pub async fn generate(
        &self,
        title: &str,
        attendees: &[String],
        documents: &[ContextDocument],
    ) -> Briefing {
        let prompt = build_prompt(title, attendees, documents);
        match self.summarize(&prompt).await {
            Ok(summary) => Briefing::Summary(summary),
            Err(e) => {
                tracing::warn!(error = %e, "Summarization failed");
                Briefing::Unavailable
            }
        }
    }

    async fn summarize(&self, prompt: &str) -> Result<String, CatalystError> {
        let request = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_new_tokens: MAX_NEW_TOKENS,
            },
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = ensure_success(SERVICE, response).await?;
        let outputs: Vec<SummaryOutput> = read_json(SERVICE, response).await?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .ok_or_else(|| CatalystError::payload(SERVICE, "empty result array"))
    }
}

/// Prompt sent to the model: title, attendees, then every context block
pub fn build_prompt(title: &str, attendees: &[String], documents: &[ContextDocument]) -> String {
    let context = documents
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    format!(
        "Meeting Title: {}\nAttendees: {}\n\nContext:\n{}\n\n\
         Provide a concise briefing summarizing the purpose, key points, action items, and potential questions.\n",
        title,
        attendees.join(", "),
        context
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::Endpoints;
    use crate::models::{DocumentKind, BRIEFING_ERROR};

    fn generator(server: &MockServer) -> BriefingGenerator {
        let config = CatalystConfig::new("P", "K", "hf_key")
            .with_endpoints(Endpoints::all_at(&server.uri()));
        BriefingGenerator::new(&config, reqwest::Client::new())
    }

    fn docs() -> Vec<ContextDocument> {
        vec![
            ContextDocument::new(DocumentKind::Drive, "Spend up 4%"),
            ContextDocument::new(DocumentKind::Notion, "Budget FY27"),
        ]
    }

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt(
            "Budget Review",
            &["ana@example.com".to_string(), "raj@example.com".to_string()],
            &docs(),
        );
        assert_eq!(
            prompt,
            "Meeting Title: Budget Review\n\
             Attendees: ana@example.com, raj@example.com\n\
             \n\
             Context:\n\
             Spend up 4%\n---\nBudget FY27\n\
             \n\
             Provide a concise briefing summarizing the purpose, key points, action items, and potential questions.\n"
        );
    }

    #[tokio::test]
    async fn test_generate_returns_first_summary() {
        let server = MockServer::start().await;
        let prompt = build_prompt("Budget Review", &[], &docs());
        Mock::given(method("POST"))
            .and(path("/models/sshleifer/distilbart-cnn-12-6"))
            .and(header("Authorization", "Bearer hf_key"))
            .and(body_json(json!({
                "inputs": prompt,
                "parameters": {"max_new_tokens": 300}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"summary_text": "Review the Q3 budget."},
                {"summary_text": "ignored"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let briefing = generator(&server).generate("Budget Review", &[], &docs()).await;
        assert_eq!(briefing, Briefing::Summary("Review the Q3 budget.".to_string()));
    }

    #[tokio::test]
    async fn test_vendor_error_yields_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .expect(1)
            .mount(&server)
            .await;

        let briefing = generator(&server).generate("Sync", &[], &docs()).await;
        assert_eq!(briefing, Briefing::Unavailable);
        assert_eq!(briefing.as_text(), BRIEFING_ERROR);
    }

    #[tokio::test]
    async fn test_unexpected_shape_yields_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let briefing = generator(&server).generate("Sync", &[], &docs()).await;
        assert!(!briefing.is_available());
    }
}
