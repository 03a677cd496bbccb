//! In-process vector index.
//!
//! Brute-force cosine search over entries held in memory. Used for offline
//! runs and tests; contents are lost when the process exits.

use crate::vector_index::{cosine_similarity, IndexedEntry, ScoredEntry, SearchQuery, VectorIndex};
use legalqa_core::{AppError, AppResult};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Collection {
    dimension: Option<usize>,
    /// (point id, entry) in first-insertion order
    points: Vec<(u64, IndexedEntry)>,
}

/// Vector index kept in memory.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    collection: RwLock<Collection>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VectorIndex for MemoryIndex {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn ensure_collection(&self, dimension: usize) -> AppResult<()> {
        let mut collection = self.collection.write().await;
        match collection.dimension {
            Some(existing) if existing != dimension => Err(AppError::Config(format!(
                "Collection has vector size {}, configured dimension is {}",
                existing, dimension
            ))),
            Some(_) => Ok(()),
            None => {
                tracing::info!("Created in-memory collection ({} dimensions)", dimension);
                collection.dimension = Some(dimension);
                Ok(())
            }
        }
    }

    async fn upsert(&self, entries: &[IndexedEntry]) -> AppResult<()> {
        let mut collection = self.collection.write().await;
        let dimension = collection.dimension.ok_or_else(|| {
            AppError::IndexUnavailable("Collection has not been created".to_string())
        })?;

        for indexed in entries {
            if indexed.vector.len() != dimension {
                return Err(AppError::Knowledge(format!(
                    "Entry '{}' has {} dimensions, expected {}",
                    indexed.entry.id,
                    indexed.vector.len(),
                    dimension
                )));
            }

            let id = indexed.point_id();
            match collection.points.iter().position(|(pid, _)| *pid == id) {
                Some(pos) => collection.points[pos].1 = indexed.clone(),
                None => collection.points.push((id, indexed.clone())),
            }
        }

        tracing::debug!("Upserted {} entries into memory index", entries.len());
        Ok(())
    }

    async fn search(&self, query: &SearchQuery<'_>) -> AppResult<Vec<ScoredEntry>> {
        let collection = self.collection.read().await;

        let mut hits: Vec<ScoredEntry> = collection
            .points
            .iter()
            .filter(|(_, p)| query.category.map_or(true, |c| p.entry.category == c))
            .map(|(_, p)| ScoredEntry {
                entry: p.entry.clone(),
                score: cosine_similarity(query.vector, &p.vector),
            })
            .filter(|hit| hit.score >= query.score_threshold)
            .collect();

        // Stable: equal scores keep insertion order
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(query.limit);

        Ok(hits)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.collection.read().await.points.len() as u64)
    }
}
