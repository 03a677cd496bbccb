//! Embedding provider trait and factory.

use super::providers::{OllamaProvider, OpenAiProvider, TrigramProvider};
use legalqa_core::config::EmbeddingSettings;
use legalqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Text used for the startup dimension probe.
const DIMENSION_PROBE_TEXT: &str = "statute of limitations";

/// Trait for embedding providers.
///
/// Network and quota failures surface as `AppError::EmbeddingUnavailable`.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "openai", "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("Cannot embed empty text".to_string()));
        }

        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results.pop().ok_or_else(|| {
            AppError::EmbeddingUnavailable(format!(
                "{} returned no embedding",
                self.provider_name()
            ))
        })
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramProvider::new(settings.dimension))),

        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI embedding provider requires an API key".to_string())
            })?;
            let provider = OpenAiProvider::new(
                settings.endpoint.as_deref(),
                api_key,
                &settings.model,
                settings.dimension,
                timeout,
            )?;
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider = OllamaProvider::new(
                settings.endpoint.as_deref(),
                &settings.model,
                settings.dimension,
                timeout,
            )?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, ollama, trigram",
            settings.provider
        ))),
    }
}

/// Embed one probe text and check the vector length against `expected`.
///
/// Run once at startup; a mismatch is a configuration error.
pub async fn verify_dimensions(
    provider: &dyn EmbeddingProvider,
    expected: usize,
) -> AppResult<()> {
    let probe = provider.embed(DIMENSION_PROBE_TEXT).await?;

    if probe.len() != expected {
        return Err(AppError::Config(format!(
            "Embedding model '{}' returned {} dimensions, index expects {}",
            provider.model_name(),
            probe.len(),
            expected
        )));
    }

    tracing::debug!(
        "Embedding provider '{}' verified at {} dimensions",
        provider.provider_name(),
        expected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: provider.to_string(),
            dimension: 384,
            ..EmbeddingSettings::default()
        }
    }

    #[test]
    fn test_create_trigram_provider() {
        let provider =
            create_provider(&settings("trigram"), None, Duration::from_secs(5)).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_openai_requires_key() {
        let result = create_provider(&settings("openai"), None, Duration::from_secs(5));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&settings("gguf"), None, Duration::from_secs(5));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_embed_rejects_blank_text() {
        let provider = TrigramProvider::new(16);
        let result = provider.embed("   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_verify_dimensions() {
        let provider = TrigramProvider::new(384);
        assert!(verify_dimensions(&provider, 384).await.is_ok());

        let err = verify_dimensions(&provider, 1536).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("1536"));
    }
}
