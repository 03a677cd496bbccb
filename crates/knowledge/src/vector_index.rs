//! Vector index abstraction for knowledge entries.
//!
//! Defines a trait for provider-agnostic vector storage and retrieval.
//! Every failure to reach the backend surfaces as
//! `AppError::IndexUnavailable`.

use crate::types::KnowledgeEntry;
use legalqa_core::AppResult;
use sha2::{Digest, Sha256};

/// A knowledge entry with its embedding, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntry {
    pub entry: KnowledgeEntry,
    pub vector: Vec<f32>,
}

impl IndexedEntry {
    /// Stable point id derived from the entry id.
    pub fn point_id(&self) -> u64 {
        point_id(&self.entry.id)
    }
}

/// A nearest-neighbour query.
#[derive(Debug, Clone)]
pub struct SearchQuery<'a> {
    pub vector: &'a [f32],
    pub limit: usize,
    /// Minimum cosine similarity a hit must reach
    pub score_threshold: f32,
    /// Only entries whose category equals this label
    pub category: Option<&'a str>,
}

/// A hit returned by the index, in the index's native order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: KnowledgeEntry,
    pub score: f32,
}

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Creating the collection on first use
/// - Upserting entries by deterministic point id
/// - Searching for similar vectors under cosine similarity
/// - Counting stored entries
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend identifier (e.g., "qdrant", "memory").
    fn backend_name(&self) -> &str;

    /// Create the collection if missing. An existing collection with a
    /// different vector size is a configuration error.
    async fn ensure_collection(&self, dimension: usize) -> AppResult<()>;

    /// Insert or replace entries. Re-upserting the same entry id is a no-op
    /// apart from refreshing its payload.
    async fn upsert(&self, entries: &[IndexedEntry]) -> AppResult<()>;

    /// Top-`limit` entries by descending similarity.
    async fn search(&self, query: &SearchQuery<'_>) -> AppResult<Vec<ScoredEntry>>;

    /// Number of stored entries (0 when the collection does not exist).
    async fn count(&self) -> AppResult<u64>;
}

/// Derive a point id from an entry id.
///
/// The first eight bytes of the SHA-256 digest, big-endian. The same entry
/// id always maps to the same point, which makes reindexing idempotent.
pub fn point_id(entry_id: &str) -> u64 {
    let digest = Sha256::digest(entry_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
