//! Local generation through Ollama's `/api/generate`.

use super::{http_client, status_error};
use crate::client::{Completion, CompletionRequest, LlmClient, TokenUsage};
use legalqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    options: Sampling,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Sampling {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    model: String,
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

/// Client for a local Ollama runtime.
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client("Ollama", timeout)?,
        })
    }

    fn body<'a>(request: &'a CompletionRequest) -> GenerateBody<'a> {
        GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            options: Sampling {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
            stream: false,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<Completion> {
        tracing::debug!(
            "Ollama generate: model={}, prompt {} chars",
            request.model,
            request.prompt.len()
        );

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&Self::body(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error("Ollama", response).await);
        }

        let reply: GenerateReply = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Malformed Ollama reply: {}", e)))?;

        if reply.response.trim().is_empty() {
            return Err(AppError::Llm("Ollama returned a blank completion".to_string()));
        }

        Ok(Completion {
            truncated: reply.done_reason.as_deref() == Some("length"),
            text: reply.response,
            model: reply.model,
            usage: TokenUsage {
                prompt_tokens: reply.prompt_eval_count,
                completion_tokens: reply.eval_count,
            },
        })
    }
}
