//! Qdrant-backed vector index.
//!
//! Entries are stored as points with a deterministic id and a payload of
//! `faq_id`, `question`, `answer`, `category` and `keywords`. The
//! collection holds a single unnamed vector per point under cosine
//! distance.

use crate::types::KnowledgeEntry;
use crate::vector_index::{IndexedEntry, ScoredEntry, SearchQuery, VectorIndex};
use legalqa_core::{AppError, AppResult};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    vectors_config, CollectionInfo, Condition, CountPointsBuilder, CreateCollectionBuilder,
    Distance, Filter, ListValue, PointStruct, QueryPointsBuilder, ScoredPoint,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Qdrant, QdrantError};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

const PAYLOAD_FAQ_ID: &str = "faq_id";
const PAYLOAD_QUESTION: &str = "question";
const PAYLOAD_ANSWER: &str = "answer";
const PAYLOAD_CATEGORY: &str = "category";
const PAYLOAD_KEYWORDS: &str = "keywords";

/// Qdrant-backed vector index.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
}

impl std::fmt::Debug for QdrantIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantIndex")
            .field("collection", &self.collection)
            .finish()
    }
}

fn unavailable(action: &'static str) -> impl Fn(QdrantError) -> AppError {
    move |e| AppError::IndexUnavailable(format!("Qdrant {} failed: {}", action, e))
}

fn string_value(text: &str) -> Value {
    Value {
        kind: Some(Kind::StringValue(text.to_string())),
    }
}

fn extract_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn extract_strings(payload: &HashMap<String, Value>, key: &str) -> Vec<String> {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::ListValue(list)) => list
            .values
            .iter()
            .filter_map(|v| match &v.kind {
                Some(Kind::StringValue(s)) => Some(s.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Convert an indexed entry into a Qdrant point.
fn entry_to_point(indexed: &IndexedEntry) -> PointStruct {
    let entry = &indexed.entry;
    let mut payload: HashMap<String, Value> = HashMap::new();
    payload.insert(PAYLOAD_FAQ_ID.to_string(), string_value(&entry.id));
    payload.insert(PAYLOAD_QUESTION.to_string(), string_value(&entry.question));
    payload.insert(PAYLOAD_ANSWER.to_string(), string_value(&entry.answer));
    payload.insert(PAYLOAD_CATEGORY.to_string(), string_value(&entry.category));
    payload.insert(
        PAYLOAD_KEYWORDS.to_string(),
        Value {
            kind: Some(Kind::ListValue(ListValue {
                values: entry.keywords.iter().map(|k| string_value(k)).collect(),
            })),
        },
    );

    PointStruct::new(indexed.point_id(), indexed.vector.clone(), payload)
}

/// Rebuild the entry stored in a scored point.
///
/// Points without the identifying payload fields are skipped.
fn scored_point_to_entry(point: &ScoredPoint) -> Option<ScoredEntry> {
    let payload = &point.payload;
    let entry = KnowledgeEntry {
        id: extract_string(payload, PAYLOAD_FAQ_ID)?,
        question: extract_string(payload, PAYLOAD_QUESTION)?,
        answer: extract_string(payload, PAYLOAD_ANSWER)?,
        category: extract_string(payload, PAYLOAD_CATEGORY).unwrap_or_default(),
        keywords: extract_strings(payload, PAYLOAD_KEYWORDS),
    };

    Some(ScoredEntry {
        entry,
        score: point.score,
    })
}

fn category_filter(category: &str) -> Filter {
    Filter::must([Condition::matches(PAYLOAD_CATEGORY, category.to_string())])
}

/// Size of the collection's single unnamed vector.
///
/// Collections with named vectors cannot hold these points and are
/// rejected as misconfigured.
fn unnamed_vector_size(collection: &str, info: &CollectionInfo) -> AppResult<u64> {
    let config = info
        .config
        .as_ref()
        .and_then(|c| c.params.as_ref())
        .and_then(|p| p.vectors_config.as_ref())
        .and_then(|v| v.config.as_ref());

    match config {
        Some(vectors_config::Config::Params(params)) => Ok(params.size),
        Some(vectors_config::Config::ParamsMap(_)) => Err(AppError::Config(format!(
            "Qdrant collection '{}' uses named vectors; expected a single unnamed vector",
            collection
        ))),
        None => Err(AppError::IndexUnavailable(format!(
            "Qdrant collection '{}' did not report its vector configuration",
            collection
        ))),
    }
}

impl QdrantIndex {
    /// Create a client for `url` (e.g. "http://localhost:6334").
    ///
    /// No connection is made until the first request.
    pub fn new(url: &str, collection: &str, timeout: Duration) -> AppResult<Self> {
        let client = Qdrant::from_url(url)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Invalid Qdrant client settings: {}", e)))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    async fn exists(&self) -> AppResult<bool> {
        self.client
            .collection_exists(&self.collection)
            .await
            .map_err(unavailable("collection check"))
    }
}

#[async_trait::async_trait]
impl VectorIndex for QdrantIndex {
    fn backend_name(&self) -> &str {
        "qdrant"
    }

    async fn ensure_collection(&self, dimension: usize) -> AppResult<()> {
        if self.exists().await? {
            let response = self
                .client
                .collection_info(&self.collection)
                .await
                .map_err(unavailable("collection lookup"))?;
            let info = response.result.ok_or_else(|| {
                AppError::IndexUnavailable(format!(
                    "Qdrant returned no info for collection '{}'",
                    self.collection
                ))
            })?;

            let size = unnamed_vector_size(&self.collection, &info)?;
            if size != dimension as u64 {
                return Err(AppError::Config(format!(
                    "Qdrant collection '{}' has vector size {}, configured dimension is {}",
                    self.collection, size, dimension
                )));
            }

            debug!("Qdrant collection '{}' already exists", self.collection);
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await
            .map_err(unavailable("collection create"))?;

        info!(
            "Created Qdrant collection '{}' ({} dimensions, cosine)",
            self.collection, dimension
        );
        Ok(())
    }

    async fn upsert(&self, entries: &[IndexedEntry]) -> AppResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = entries.iter().map(entry_to_point).collect();
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(unavailable("upsert"))?;

        debug!("Upserted {} points into '{}'", entries.len(), self.collection);
        Ok(())
    }

    async fn search(&self, query: &SearchQuery<'_>) -> AppResult<Vec<ScoredEntry>> {
        let mut request = QueryPointsBuilder::new(&self.collection)
            .query(query.vector.to_vec())
            .limit(query.limit as u64)
            .score_threshold(query.score_threshold)
            .with_payload(true);
        if let Some(category) = query.category {
            request = request.filter(category_filter(category));
        }

        let response = self
            .client
            .query(request)
            .await
            .map_err(unavailable("search"))?;

        Ok(response
            .result
            .iter()
            .filter_map(scored_point_to_entry)
            .collect())
    }

    async fn count(&self) -> AppResult<u64> {
        if !self.exists().await? {
            return Ok(0);
        }

        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(unavailable("count"))?;

        Ok(response.result.map(|c| c.count).unwrap_or(0))
    }
}
