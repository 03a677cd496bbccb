//! Dataset loading and index building.
//!
//! The dataset is a JSON document `{"faqs": [...]}`. A directory is walked
//! recursively and every `*.json` file in it is merged. Entry ids must be
//! unique across the whole dataset.

use crate::embeddings::{embed_in_batches, EmbeddingProvider};
use crate::types::{IndexStats, KnowledgeEntry};
use crate::vector_index::{IndexedEntry, VectorIndex};
use legalqa_core::{AppError, AppResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct DatasetFile {
    faqs: Vec<KnowledgeEntry>,
}

/// Options for building the index.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Texts per embedding request and points per upsert
    pub batch_size: usize,
    /// Upsert even when the index already holds entries
    pub force: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            force: false,
        }
    }
}

/// Load knowledge entries from a file or directory.
pub fn load_dataset(path: &Path) -> AppResult<Vec<KnowledgeEntry>> {
    if !path.exists() {
        return Err(AppError::Knowledge(format!(
            "Dataset not found: {}",
            path.display()
        )));
    }

    let files: Vec<PathBuf> = if path.is_dir() {
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut entries = Vec::new();
    for file in &files {
        let contents = std::fs::read_to_string(file)?;
        let parsed: DatasetFile = serde_json::from_str(&contents).map_err(|e| {
            AppError::Knowledge(format!("Invalid dataset file {}: {}", file.display(), e))
        })?;
        tracing::debug!("Loaded {} entries from {:?}", parsed.faqs.len(), file);
        entries.extend(parsed.faqs);
    }

    validate_entries(&entries)?;

    tracing::info!(
        "Loaded {} knowledge entries from {} file(s)",
        entries.len(),
        files.len()
    );
    Ok(entries)
}

fn validate_entries(entries: &[KnowledgeEntry]) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(entries.len());

    for entry in entries {
        if entry.id.trim().is_empty() {
            return Err(AppError::Knowledge(
                "Dataset entry with empty id".to_string(),
            ));
        }
        if entry.question.trim().is_empty() || entry.answer.trim().is_empty() {
            return Err(AppError::Knowledge(format!(
                "Dataset entry '{}' has an empty question or answer",
                entry.id
            )));
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(AppError::Knowledge(format!(
                "Duplicate dataset entry id: '{}'",
                entry.id
            )));
        }
    }

    Ok(())
}

/// Embed `entries` and upsert them into `index`.
///
/// Creates the collection when missing. Unless `options.force` is set, an
/// index that already holds entries is left untouched. Point ids derive from
/// entry ids, so a forced run replaces points instead of duplicating them.
pub async fn index_entries(
    entries: &[KnowledgeEntry],
    provider: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    options: &IndexOptions,
) -> AppResult<IndexStats> {
    let start = Instant::now();

    index.ensure_collection(provider.dimensions()).await?;

    let existing = index.count().await?;
    if existing > 0 && !options.force {
        tracing::info!(
            "Index already holds {} entries, skipping indexing",
            existing
        );
        return Ok(IndexStats {
            entries_indexed: 0,
            skipped: true,
            duration_secs: start.elapsed().as_secs_f64(),
        });
    }

    let texts: Vec<String> = entries
        .iter()
        .map(|e| e.embedding_text().to_string())
        .collect();
    let vectors = embed_in_batches(provider, &texts, options.batch_size).await?;

    let indexed: Vec<IndexedEntry> = entries
        .iter()
        .cloned()
        .zip(vectors)
        .map(|(entry, vector)| IndexedEntry { entry, vector })
        .collect();

    for batch in indexed.chunks(options.batch_size.max(1)) {
        index.upsert(batch).await?;
    }

    let duration = start.elapsed();
    tracing::info!(
        "Indexed {} entries into '{}' backend in {:.2}s",
        indexed.len(),
        index.backend_name(),
        duration.as_secs_f64()
    );

    Ok(IndexStats {
        entries_indexed: indexed.len(),
        skipped: false,
        duration_secs: duration.as_secs_f64(),
    })
}
