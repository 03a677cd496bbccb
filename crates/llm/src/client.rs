//! Completion request and response types, and the client trait.

use legalqa_core::AppResult;
use serde::Serialize;

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Output token cap used when none is configured.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// One grounded-answer completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,

    /// Fixed instructions, sent ahead of the prompt
    pub system: Option<String>,

    /// Rendered context and question
    pub prompt: String,

    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A successful completion. `text` is never blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub usage: TokenUsage,

    /// The backend stopped at the output token cap
    pub truncated: bool,
}

/// A generative model backend.
///
/// Transport failures, non-2xx statuses, unparseable bodies and blank
/// completions are all errors.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> AppResult<Completion>;
}
