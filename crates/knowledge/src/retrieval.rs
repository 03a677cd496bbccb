//! Retrieval of ranked knowledge matches for a query vector.

use crate::types::RetrievedMatch;
use crate::vector_index::{ScoredEntry, SearchQuery, VectorIndex};
use legalqa_core::config::RetrievalSettings;
use legalqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Nearest-neighbour retrieval with a similarity cutoff.
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    top_k: usize,
    similarity_threshold: f32,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorIndex>, settings: &RetrievalSettings) -> Self {
        Self {
            index,
            top_k: settings.top_k,
            similarity_threshold: settings.similarity_threshold,
        }
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Top-K matches scoring at least the threshold, best first.
    ///
    /// An empty result means no relevant knowledge. Any backend failure is
    /// reported as `IndexUnavailable`.
    pub async fn retrieve(
        &self,
        query_vector: &[f32],
        category: Option<&str>,
    ) -> AppResult<Vec<RetrievedMatch>> {
        let query = SearchQuery {
            vector: query_vector,
            limit: self.top_k,
            score_threshold: self.similarity_threshold,
            category,
        };

        let hits = self.index.search(&query).await.map_err(|e| match e {
            AppError::IndexUnavailable(_) => e,
            other => AppError::IndexUnavailable(other.to_string()),
        })?;

        tracing::debug!(
            "Index returned {} hits - scores: {:?}",
            hits.len(),
            hits.iter().map(|h| h.score).collect::<Vec<_>>()
        );

        let matches = rank_hits(hits, self.top_k, self.similarity_threshold);

        if matches.is_empty() {
            tracing::info!(
                "No relevant entries found (all scores below {:.2} threshold)",
                self.similarity_threshold
            );
        } else {
            tracing::info!(
                "Retrieved {} relevant entries (top score: {:.3})",
                matches.len(),
                matches[0].score
            );
        }

        Ok(matches)
    }
}

/// Apply the cutoff, order by descending score and keep at most `top_k`.
///
/// The sort is stable so equal scores keep the index's order. Scores are
/// clipped to [0, 1].
pub fn rank_hits(hits: Vec<ScoredEntry>, top_k: usize, threshold: f32) -> Vec<RetrievedMatch> {
    let mut kept: Vec<ScoredEntry> = hits
        .into_iter()
        .filter(|hit| hit.score >= threshold)
        .collect();

    kept.sort_by(|a, b| b.score.total_cmp(&a.score));
    kept.truncate(top_k);

    kept.into_iter()
        .map(|hit| RetrievedMatch::new(hit.entry, hit.score))
        .collect()
}
