//! Grounded answer generation with graceful degradation.
//!
//! The model sees a fixed instruction segment, the retrieved entries and
//! the user's question. When the model cannot be used, the best stored
//! answer is returned verbatim with a note instead.

use crate::types::{GeneratedText, GenerationOutcome, RetrievedMatch};
use legalqa_core::config::GenerationSettings;
use legalqa_core::{AppError, AppResult};
use legalqa_llm::{CompletionRequest, LlmClient};
use legalqa_prompt::{build_prompt, ContextEntry, PromptDefinition, PromptInput};
use std::sync::Arc;
use std::time::Duration;

/// Returned when no entry clears the similarity threshold.
pub const NO_CONTEXT_MESSAGE: &str = "I couldn't find any relevant information in our FAQ database for your question. This might be outside the scope of our current knowledge base. Please consider rephrasing your question or consulting with a legal professional directly.";

/// Appended to a stored answer when generation is unavailable.
pub const FALLBACK_DISCLAIMER: &str = "Note: This is general legal information from our FAQ database. For advice specific to your situation, please consult with a qualified attorney.\n\n(AI generation temporarily unavailable - showing direct FAQ match)";

/// The top match's stored answer followed by the fallback disclaimer.
pub fn fallback_answer(top: &RetrievedMatch) -> String {
    format!("{}\n\n{}", top.entry.answer, FALLBACK_DISCLAIMER)
}

/// Produces answer text from a query and its matches.
pub struct Generator {
    client: Option<Arc<dyn LlmClient>>,
    prompt: PromptDefinition,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl Generator {
    /// `client` is `None` when no generation provider is configured; every
    /// answer with context then degrades to the stored answer.
    pub fn new(
        client: Option<Arc<dyn LlmClient>>,
        prompt: PromptDefinition,
        settings: &GenerationSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            prompt,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Produce the answer text. Never fails.
    pub async fn generate(&self, query: &str, matches: &[RetrievedMatch]) -> GeneratedText {
        let Some(top) = matches.first() else {
            return GeneratedText {
                text: NO_CONTEXT_MESSAGE.to_string(),
                outcome: GenerationOutcome::NoContext,
            };
        };

        match self.call_model(query, matches).await {
            Ok(text) => GeneratedText {
                text,
                outcome: GenerationOutcome::Generated,
            },
            Err(e) => {
                tracing::warn!("Answer generation degraded to stored answer: {}", e);
                GeneratedText {
                    text: fallback_answer(top),
                    outcome: GenerationOutcome::Degraded,
                }
            }
        }
    }

    async fn call_model(&self, query: &str, matches: &[RetrievedMatch]) -> AppResult<String> {
        let client = self.client.as_ref().ok_or_else(|| {
            AppError::GenerationUnavailable("No generation provider configured".to_string())
        })?;

        let input = PromptInput {
            query: query.to_string(),
            matches: matches
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    ContextEntry::new(
                        i + 1,
                        m.entry.question.as_str(),
                        m.entry.answer.as_str(),
                        m.entry.category.as_str(),
                        m.score,
                    )
                })
                .collect(),
        };

        let built = build_prompt(&self.prompt, &input)
            .map_err(|e| AppError::GenerationUnavailable(e.to_string()))?;

        let mut request = CompletionRequest::new(&self.model, built.user)
            .with_sampling(self.temperature, self.max_tokens);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let completion = tokio::time::timeout(self.timeout, client.complete(&request))
            .await
            .map_err(|_| {
                AppError::GenerationUnavailable(format!(
                    "{} did not answer within {}s",
                    client.provider_name(),
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::GenerationUnavailable(e.to_string()))?;

        if completion.truncated {
            tracing::warn!(
                "Answer hit the {} token cap and may be cut short",
                self.max_tokens
            );
        }

        let text = completion.text.trim();
        if text.is_empty() {
            return Err(AppError::GenerationUnavailable(
                "Model returned an empty answer".to_string(),
            ));
        }

        tracing::info!(
            "Generated answer of {} characters ({} tokens)",
            text.len(),
            completion.usage.total()
        );
        Ok(text.to_string())
    }
}
