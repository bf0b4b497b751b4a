//! OpenAI-compatible chat completions client.

use crate::http::{build_client, decode, join_url, record_failure, send};
use async_trait::async_trait;
use config::LlmConfig;
use errors::{ProviderError, Service};
use orion_core::traits::{GenerationService, ProviderResult};
use orion_core::types::{GenerationRequest, RequestType};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const JOURNAL_REFLECTION_PROMPT: &str = "You are a thoughtful journaling companion. \
Read the journal entry and write a short, warm reflection in the second person: \
name the main feeling, notice one pattern or strength, and offer one gentle question \
to carry forward. Do not give medical advice. Keep it under 150 words.";

const OPPORTUNITY_EVALUATION_PROMPT: &str = "You are a career advisor evaluating how well \
a job opportunity fits a candidate. Respond with a single JSON object and nothing else, \
using exactly these fields: \"fitScoreOutOf10\" (number 0-10), \"recommendation\" (string), \
\"reasoning\" (string), \"pros\" (array of strings), \"cons\" (array of strings), \
\"missingSkills\" (array of strings), \"suggestedNextSteps\" (array of strings).";

pub struct OpenAiGenerationService {
    client: Client,
    config: LlmConfig
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>
}

/// System prompt sent ahead of the caller's context.
pub fn system_prompt(request_type: RequestType) -> &'static str {
    match request_type {
        RequestType::JournalReflection => JOURNAL_REFLECTION_PROMPT,
        RequestType::OpportunityEvaluation => OPPORTUNITY_EVALUATION_PROMPT
    }
}

impl OpenAiGenerationService {
    pub fn new(config: LlmConfig) -> Result<Self, ProviderError> {
        let client = build_client(Service::Llm, config.timeout_seconds)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationService for OpenAiGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt(request.request_type)
                },
                ChatMessage {
                    role: "user",
                    content: &request.primary_context
                }
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens
        };

        let mut http_request = self
            .client
            .post(join_url(&self.config.base_url, "chat/completions"))
            .json(&body);
        if let Some(key) = &self.config.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response: ChatResponse =
            decode(Service::Llm, send(Service::Llm, http_request).await?).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty());

        match content {
            Some(content) => {
                tracing::debug!(
                    request_type = %request.request_type,
                    chars = content.len(),
                    "Generation completed"
                );
                Ok(content)
            }
            None => {
                record_failure(Service::Llm);
                Err(ProviderError::empty(Service::Llm, "completion"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> OpenAiGenerationService {
        OpenAiGenerationService::new(LlmConfig {
            base_url: server.uri(),
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        })
        .unwrap()
    }

    fn reflection_request() -> GenerationRequest {
        GenerationRequest {
            request_type: RequestType::JournalReflection,
            primary_context: "Had a great day".to_string(),
            temperature: 0.5,
            max_tokens: 500
        }
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.5,
                "max_tokens": 500,
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": "Had a great day" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "  It sounds restorative.  " }
                }]
            })))
            .mount(&server)
            .await;

        let text = service(&server).generate(&reflection_request()).await.unwrap();
        assert_eq!(text, "It sounds restorative.");
    }

    #[tokio::test]
    async fn test_generate_empty_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = service(&server)
            .generate(&reflection_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResult { service: Service::Llm, .. }));
    }

    #[tokio::test]
    async fn test_generate_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = service(&server)
            .generate(&reflection_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 500, .. }));
    }

    #[test]
    fn test_evaluation_prompt_names_every_field() {
        let prompt = system_prompt(RequestType::OpportunityEvaluation);
        for field in [
            "fitScoreOutOf10",
            "recommendation",
            "reasoning",
            "pros",
            "cons",
            "missingSkills",
            "suggestedNextSteps"
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }
}
