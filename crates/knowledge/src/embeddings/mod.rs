//! Embedding adapters.
//!
//! Converts text into fixed-dimension vectors through a provider-agnostic
//! trait. Query-time embedding makes exactly one outbound call per text;
//! index-time embedding is batched.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, verify_dimensions, EmbeddingProvider};

use legalqa_core::{AppError, AppResult};

/// Embed `texts` in chunks of `batch_size`, preserving order.
pub async fn embed_in_batches(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
) -> AppResult<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let batch_size = batch_size.max(1);
    let mut embeddings = Vec::with_capacity(texts.len());

    for (batch_no, batch) in texts.chunks(batch_size).enumerate() {
        tracing::debug!(
            "Embedding batch {} ({} texts) with provider '{}'",
            batch_no + 1,
            batch.len(),
            provider.provider_name()
        );

        let vectors = provider.embed_batch(batch).await?;
        if vectors.len() != batch.len() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "Provider returned {} embeddings for {} texts",
                vectors.len(),
                batch.len()
            )));
        }
        embeddings.extend(vectors);
    }

    tracing::info!(
        "Generated {} embeddings using provider '{}' (model: {})",
        embeddings.len(),
        provider.provider_name(),
        provider.model_name()
    );

    Ok(embeddings)
}
