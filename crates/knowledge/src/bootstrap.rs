//! Component construction from configuration.

use crate::dataset::{index_entries, load_dataset, IndexOptions};
use crate::embeddings::{create_provider, verify_dimensions, EmbeddingProvider};
use crate::generation::Generator;
use crate::interaction_log::InteractionLog;
use crate::memory_index::MemoryIndex;
use crate::pipeline::AskPipeline;
use crate::qdrant::QdrantIndex;
use crate::retrieval::Retriever;
use crate::types::IndexStats;
use crate::vector_index::VectorIndex;
use legalqa_core::{AppConfig, AppError, AppResult};
use legalqa_llm::create_client;
use legalqa_prompt::{load_prompt, GROUNDED_ANSWER_PROMPT};
use std::sync::Arc;

/// Create the configured embedding provider.
pub fn create_embedder(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    create_provider(
        &config.embedding,
        config.api_key.as_deref(),
        config.request_timeout(),
    )
}

/// Create the configured vector index backend.
pub fn create_index(config: &AppConfig) -> AppResult<Arc<dyn VectorIndex>> {
    let settings = &config.vector_index;
    match settings.backend.as_str() {
        "qdrant" => Ok(Arc::new(QdrantIndex::new(
            &settings.base_url(),
            &settings.collection,
            config.request_timeout(),
        )?)),
        "memory" => Ok(Arc::new(MemoryIndex::new())),
        other => Err(AppError::Config(format!(
            "Unknown vector index backend: '{}'",
            other
        ))),
    }
}

/// Create the generator, with no model client when generation is disabled.
pub fn create_generator(config: &AppConfig) -> AppResult<Generator> {
    let prompt = load_prompt(config.storage.prompts_dir.as_deref(), GROUNDED_ANSWER_PROMPT)?;

    let client = if config.generation_configured() {
        let client = create_client(
            &config.generation.provider,
            config.generation.endpoint.as_deref(),
            config.api_key.as_deref(),
            config.request_timeout(),
        )?;
        Some(client)
    } else {
        tracing::warn!("No generation provider configured; answers will use stored entries");
        None
    };

    Ok(Generator::new(
        client,
        prompt,
        &config.generation,
        config.request_timeout(),
    ))
}

/// Load the dataset and index it.
///
/// Without `force`, an index that already holds entries is left as is and
/// the dataset is not read.
pub async fn index_dataset(
    config: &AppConfig,
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    force: bool,
) -> AppResult<IndexStats> {
    index.ensure_collection(config.embedding.dimension).await?;

    if !force && index.count().await? > 0 {
        return Ok(IndexStats {
            entries_indexed: 0,
            skipped: true,
            duration_secs: 0.0,
        });
    }

    let entries = load_dataset(&config.storage.dataset_path)?;
    let options = IndexOptions {
        batch_size: config.embedding.batch_size,
        force,
    };
    index_entries(&entries, embedder, index, &options).await
}

/// Build the ask pipeline and make sure the index is populated.
///
/// A dimension mismatch between the embedding model and the configuration
/// is fatal. An unreachable vector index is not: the service starts and
/// reports itself unhealthy until the index comes back.
pub async fn build_pipeline(config: &AppConfig) -> AppResult<AskPipeline> {
    let embedder = create_embedder(config)?;
    match tokio::time::timeout(
        config.request_timeout(),
        verify_dimensions(embedder.as_ref(), config.embedding.dimension),
    )
    .await
    {
        Ok(Err(e @ AppError::Config(_))) => return Err(e),
        Ok(Err(e)) => tracing::warn!("Skipping embedding dimension probe: {}", e),
        Err(_) => tracing::warn!("Skipping embedding dimension probe: timed out"),
        Ok(Ok(())) => {}
    }

    let index = create_index(config)?;
    match index_dataset(config, embedder.as_ref(), index.as_ref(), false).await {
        Ok(stats) if stats.skipped => tracing::info!("Vector index already populated"),
        Ok(stats) => tracing::info!("Indexed {} knowledge entries", stats.entries_indexed),
        Err(e @ AppError::IndexUnavailable(_)) => {
            tracing::error!("Vector index unavailable at startup: {}", e)
        }
        Err(e) => return Err(e),
    }

    let log = InteractionLog::open(&config.storage.database_path)?;
    let retriever = Retriever::new(index, &config.retrieval);
    let generator = create_generator(config)?;

    tracing::info!(
        "Pipeline ready: embedding={}/{}, index={}, generation={}",
        embedder.provider_name(),
        embedder.model_name(),
        config.vector_index.backend,
        config.generation.provider
    );

    Ok(AskPipeline::new(
        embedder,
        retriever,
        generator,
        log,
        config.request_timeout(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AskRequest;
    use tempfile::TempDir;

    fn offline_config(temp: &TempDir) -> AppConfig {
        let dataset = temp.path().join("legal_faqs.json");
        std::fs::write(
            &dataset,
            r#"{"faqs": [
                {"id": "faq_001", "question": "What is the statute of limitations for personal injury lawsuits?",
                 "answer": "Usually two to three years.", "category": "Personal Injury"},
                {"id": "faq_002", "question": "Can my landlord keep my security deposit?",
                 "answer": "Only for unpaid rent or damage.", "category": "Landlord-Tenant"}
            ]}"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.embedding.provider = "trigram".to_string();
        config.embedding.dimension = 256;
        config.generation.provider = "none".to_string();
        config.vector_index.backend = "memory".to_string();
        config.retrieval.similarity_threshold = 0.3;
        config.storage.dataset_path = dataset;
        config.storage.database_path = temp.path().join("interactions.db");
        config
    }

    #[tokio::test]
    async fn test_offline_pipeline_answers_from_dataset() {
        let temp = TempDir::new().unwrap();
        let config = offline_config(&temp);

        let pipeline = build_pipeline(&config).await.unwrap();
        assert_eq!(pipeline.entry_count().await.unwrap(), 2);

        let answer = pipeline
            .ask(&AskRequest::new(
                "What is the statute of limitations for personal injury lawsuits?",
            ))
            .await
            .unwrap();
        assert_eq!(answer.sources[0].entry.id, "faq_001");
        assert!(answer.text.contains("Usually two to three years."));
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let temp = TempDir::new().unwrap();
        let mut config = offline_config(&temp);
        config.vector_index.backend = "lancedb".to_string();
        assert!(matches!(create_index(&config), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_generator_disabled_for_none_provider() {
        let temp = TempDir::new().unwrap();
        let config = offline_config(&temp);
        assert!(!create_generator(&config).unwrap().is_configured());
    }

    #[tokio::test]
    async fn test_missing_dataset_is_fatal_for_empty_index() {
        let temp = TempDir::new().unwrap();
        let mut config = offline_config(&temp);
        config.storage.dataset_path = temp.path().join("missing.json");
        assert!(matches!(
            build_pipeline(&config).await,
            Err(AppError::Knowledge(_))
        ));
    }
}
