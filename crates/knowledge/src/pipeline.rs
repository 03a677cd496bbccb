//! Ask pipeline orchestration.
//!
//! Per request: validate, embed, retrieve, generate, log, respond. No state
//! is kept between requests; collaborators are shared read-only.

use crate::embeddings::EmbeddingProvider;
use crate::generation::Generator;
use crate::interaction_log::InteractionLog;
use crate::retrieval::Retriever;
use crate::types::{
    Answer, AskRequest, HealthReport, NewInteraction, RetrievedMatch, MAX_QUERY_CHARS,
};
use chrono::Utc;
use legalqa_core::{AppError, AppResult};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest the response waits on an interaction log write.
pub const LOG_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Check a raw query and return it trimmed.
pub fn validate_query(query: &str) -> AppResult<&str> {
    let trimmed = query.trim();
    let chars = trimmed.chars().count();

    if chars == 0 {
        return Err(AppError::Validation("Query must not be empty".to_string()));
    }
    if chars > MAX_QUERY_CHARS {
        return Err(AppError::Validation(format!(
            "Query must be at most {} characters (got {})",
            MAX_QUERY_CHARS, chars
        )));
    }

    Ok(trimmed)
}

/// The question-answering pipeline.
pub struct AskPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Retriever,
    generator: Generator,
    log: InteractionLog,
    timeout: Duration,
}

impl AskPipeline {
    /// `timeout` bounds each embedding and index call.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        retriever: Retriever,
        generator: Generator,
        log: InteractionLog,
        timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            retriever,
            generator,
            log,
            timeout,
        }
    }

    pub fn interaction_log(&self) -> &InteractionLog {
        &self.log
    }

    /// Answer one question.
    ///
    /// Validation failures return before any external call and leave no log
    /// record. Embedding and index failures are logged with the error flag
    /// and then returned. Generation failures degrade to the stored answer.
    #[tracing::instrument(skip(self, request), fields(request_id = %uuid::Uuid::new_v4()))]
    pub async fn ask(&self, request: &AskRequest) -> AppResult<Answer> {
        let query = validate_query(&request.query)?;
        let start = Instant::now();

        tracing::info!("Answering query ({} chars)", query.chars().count());

        let matches = match self.embed_and_retrieve(query, request.category.as_deref()).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!("Request failed: {}", e);
                self.write_log(NewInteraction {
                    user_query: query.to_string(),
                    matches: Vec::new(),
                    ai_response: String::new(),
                    response_time_ms: elapsed_ms(start),
                    error_occurred: true,
                })
                .await;
                return Err(e);
            }
        };

        let generated = self.generator.generate(query, &matches).await;
        let response_time_ms = elapsed_ms(start);

        self.write_log(NewInteraction {
            user_query: query.to_string(),
            matches: matches.clone(),
            ai_response: generated.text.clone(),
            response_time_ms,
            error_occurred: generated.outcome.is_error(),
        })
        .await;

        tracing::info!(
            "Answered in {}ms ({}, {} sources)",
            response_time_ms,
            generated.outcome.as_str(),
            matches.len()
        );

        Ok(Answer {
            text: generated.text,
            sources: matches,
            response_time_ms,
            timestamp: Utc::now(),
            outcome: generated.outcome,
        })
    }

    async fn embed_and_retrieve(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> AppResult<Vec<RetrievedMatch>> {
        let vector = bounded(
            self.timeout,
            self.embedder.embed(query),
            AppError::EmbeddingUnavailable,
            "embedding",
        )
        .await?;

        bounded(
            self.timeout,
            self.retriever.retrieve(&vector, category),
            AppError::IndexUnavailable,
            "vector search",
        )
        .await
    }

    /// Record an interaction without letting the log delay the response.
    ///
    /// On timeout the blocking write keeps running and may still land.
    async fn write_log(&self, interaction: NewInteraction) {
        match tokio::time::timeout(LOG_WRITE_TIMEOUT, self.log.record(interaction)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::error!("Failed to log interaction: {}", e),
            Err(_) => tracing::warn!(
                "Interaction log write still pending after {}ms; responding without it",
                LOG_WRITE_TIMEOUT.as_millis()
            ),
        }
    }

    /// Number of entries in the vector index.
    pub async fn entry_count(&self) -> AppResult<u64> {
        bounded(
            self.timeout,
            self.retriever.index().count(),
            AppError::IndexUnavailable,
            "entry count",
        )
        .await
    }

    /// Readiness of the index and the generation provider.
    pub async fn health(&self) -> HealthReport {
        let (connected, entries) = match self.entry_count().await {
            Ok(count) => (true, count),
            Err(e) => {
                tracing::warn!("Health check could not reach the vector index: {}", e);
                (false, 0)
            }
        };

        HealthReport::new(connected, self.generator.is_configured(), entries)
    }
}

/// Run `fut` under `timeout`; expiry maps to `unavailable`.
async fn bounded<T, F>(
    timeout: Duration,
    fut: F,
    unavailable: fn(String) -> AppError,
    what: &str,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(unavailable(format!(
            "{} timed out after {}s",
            what,
            timeout.as_secs_f32()
        ))),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query_trims() {
        assert_eq!(validate_query("  What is a tort?  ").unwrap(), "What is a tort?");
    }

    #[test]
    fn test_validate_query_bounds() {
        assert!(matches!(validate_query("   "), Err(AppError::Validation(_))));
        assert!(validate_query(&"a".repeat(500)).is_ok());
        assert!(matches!(
            validate_query(&"a".repeat(501)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_query_counts_characters() {
        // 500 two-byte characters
        assert!(validate_query(&"é".repeat(500)).is_ok());
    }
}
