//! OpenAI chat completions backend.
//!
//! Works against api.openai.com and any server exposing the same
//! `/v1/chat/completions` contract.

use super::{http_client, status_error};
use crate::client::{Completion, CompletionRequest, LlmClient, TokenUsage};
use legalqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Client for OpenAI-compatible chat completions.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: http_client("OpenAI", timeout)?,
        })
    }

    /// System instructions first, then the user turn.
    fn body<'a>(request: &'a CompletionRequest) -> ChatBody<'a> {
        let system = request.system.as_deref().map(|content| Message {
            role: "system",
            content,
        });
        let user = Message {
            role: "user",
            content: &request.prompt,
        };

        ChatBody {
            model: &request.model,
            messages: system.into_iter().chain(std::iter::once(user)).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<Completion> {
        tracing::debug!(
            "OpenAI chat completion: model={}, prompt {} chars",
            request.model,
            request.prompt.len()
        );

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&Self::body(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error("OpenAI", response).await);
        }

        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Malformed OpenAI reply: {}", e)))?;

        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("OpenAI reply contained no choices".to_string()))?;

        let text = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::Llm("OpenAI returned a blank completion".to_string()))?;

        let usage = reply
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Completion {
            text,
            model: reply.model,
            usage,
            truncated: choice.finish_reason.as_deref() == Some("length"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new(base_url, "sk-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_system_message_comes_first() {
        let request = CompletionRequest::new("gpt-4", "question").with_system("rules");
        let body = OpenAiClient::body(&request);

        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].content, "question");
    }

    #[test]
    fn test_debug_hides_key() {
        assert!(!format!("{:?}", client(DEFAULT_OPENAI_URL)).contains("sk-test"));
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({"max_tokens": 500})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "gpt-4-turbo-preview",
                "choices": [{
                    "message": {"role": "assistant", "content": "Usually two years."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 300, "completion_tokens": 5}
            })))
            .mount(&server)
            .await;

        let completion = client(&server.uri())
            .complete(&CompletionRequest::new("gpt-4-turbo-preview", "How long?"))
            .await
            .unwrap();

        assert_eq!(completion.text, "Usually two years.");
        assert_eq!(completion.usage.total(), 305);
        assert!(!completion.truncated);
    }

    #[tokio::test]
    async fn test_quota_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("insufficient_quota"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .complete(&CompletionRequest::new("gpt-4", "How long?"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("insufficient_quota"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"model": "gpt-4", "choices": []})),
            )
            .mount(&server)
            .await;

        let result = client(&server.uri())
            .complete(&CompletionRequest::new("gpt-4", "How long?"))
            .await;

        assert!(result.is_err());
    }
}
