//! Tests for retrieval ranking correctness.

use super::fakes::{entry, hit};
use crate::dataset::{index_entries, IndexOptions};
use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::memory_index::MemoryIndex;
use crate::retrieval::{rank_hits, Retriever};
use crate::vector_index::VectorIndex;
use legalqa_core::config::RetrievalSettings;
use std::sync::Arc;

fn ids(matches: &[crate::types::RetrievedMatch]) -> Vec<&str> {
    matches.iter().map(|m| m.entry.id.as_str()).collect()
}

#[test]
fn test_threshold_is_inclusive() {
    let matches = rank_hits(vec![hit("at", 0.7), hit("below", 0.6999)], 5, 0.7);
    assert_eq!(ids(&matches), vec!["at"]);
}

#[test]
fn test_sorted_descending_and_truncated() {
    let matches = rank_hits(
        vec![
            hit("c", 0.72),
            hit("a", 0.98),
            hit("d", 0.71),
            hit("b", 0.85),
        ],
        3,
        0.7,
    );
    assert_eq!(ids(&matches), vec!["a", "b", "c"]);
}

#[test]
fn test_equal_scores_keep_index_order() {
    let matches = rank_hits(
        vec![hit("first", 0.8), hit("second", 0.8), hit("third", 0.8)],
        2,
        0.5,
    );
    assert_eq!(ids(&matches), vec!["first", "second"]);
}

#[test]
fn test_scores_are_clipped() {
    let matches = rank_hits(vec![hit("over", 1.05)], 1, 0.5);
    assert_eq!(matches[0].score, 1.0);
}

#[test]
fn test_no_hits() {
    assert!(rank_hits(vec![], 2, 0.7).is_empty());
    assert!(rank_hits(vec![hit("low", 0.1)], 2, 0.7).is_empty());
}

async fn seeded_retriever(threshold: f32) -> (Retriever, Arc<TrigramProvider>) {
    let embedder = Arc::new(TrigramProvider::new(256));
    let index = Arc::new(MemoryIndex::new());
    let entries = vec![
        entry(
            "faq_001",
            "What is the statute of limitations for personal injury lawsuits?",
            "Usually two to three years from the injury.",
            "Personal Injury",
        ),
        entry(
            "faq_002",
            "Can my landlord keep my security deposit?",
            "Only for unpaid rent or damage beyond normal wear.",
            "Landlord-Tenant",
        ),
        entry(
            "faq_003",
            "How do I contest a will in probate court?",
            "You must have standing and valid grounds such as undue influence.",
            "Estate Planning",
        ),
    ];
    index_entries(
        &entries,
        embedder.as_ref(),
        index.as_ref(),
        &IndexOptions::default(),
    )
    .await
    .unwrap();

    let retriever = Retriever::new(
        index as Arc<dyn VectorIndex>,
        &RetrievalSettings {
            top_k: 2,
            similarity_threshold: threshold,
        },
    );
    (retriever, embedder)
}

#[tokio::test]
async fn test_relevant_query_ranks_matching_entry_first() {
    let (retriever, embedder) = seeded_retriever(0.2).await;
    let vector = embedder
        .embed("statute of limitations personal injury lawsuit")
        .await
        .unwrap();

    let matches = retriever.retrieve(&vector, None).await.unwrap();

    assert!(!matches.is_empty());
    assert_eq!(matches[0].entry.id, "faq_001");
    assert!(matches.len() <= 2);
    assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_unrelated_query_returns_nothing() {
    let (retriever, embedder) = seeded_retriever(0.7).await;
    let vector = embedder.embed("pasta carbonara recipe").await.unwrap();

    let matches = retriever.retrieve(&vector, None).await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn test_category_restricts_matches() {
    let (retriever, embedder) = seeded_retriever(0.0).await;
    let vector = embedder
        .embed("statute of limitations personal injury lawsuit")
        .await
        .unwrap();

    let matches = retriever
        .retrieve(&vector, Some("Landlord-Tenant"))
        .await
        .unwrap();

    assert!(matches
        .iter()
        .all(|m| m.entry.category == "Landlord-Tenant"));
}
