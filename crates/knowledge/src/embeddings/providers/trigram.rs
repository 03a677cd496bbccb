//! Trigram embedding provider for offline operation.

use crate::embeddings::provider::EmbeddingProvider;
use legalqa_core::AppResult;
use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "do", "does", "can", "what", "how", "my", "if", "i",
];

/// Deterministic, content-dependent embeddings without a model.
///
/// Each word contributes to buckets chosen by hashing its character
/// trigrams and the whole word. Vectors are unit-normalized so cosine
/// scores stay in a comparable range. Queries that share vocabulary with
/// an entry score high; unrelated text scores near zero.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let lower = text.to_lowercase();
        let mut frequencies: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *frequencies.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &frequencies {
            let weight = (*freq as f32).sqrt();
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let bucket = self.bucket(window.iter().copied());
                vector[bucket] += weight;
            }

            let bucket = self.bucket(word.chars());
            vector[bucket] += *freq as f32;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }

    fn bucket(&self, chars: impl Iterator<Item = char>) -> usize {
        // FNV-1a
        let hash = chars.fold(0xcbf2_9ce4_8422_2325u64, |acc, c| {
            (acc ^ c as u64).wrapping_mul(0x0100_0000_01b3)
        });
        (hash % self.dimensions as u64) as usize
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::cosine_similarity;

    #[tokio::test]
    async fn test_embedding_is_unit_length() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed("statute of limitations").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_embedding_is_deterministic() {
        let provider = TrigramProvider::new(128);
        let a = provider.embed("Can my landlord keep my deposit?").await.unwrap();
        let b = provider.embed("Can my landlord keep my deposit?").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let provider = TrigramProvider::new(384);
        let query = provider
            .embed("How long do I have to file a personal injury lawsuit?")
            .await
            .unwrap();
        let related = provider
            .embed("What is the statute of limitations for a personal injury lawsuit?")
            .await
            .unwrap();
        let unrelated = provider
            .embed("How are trademarks registered internationally?")
            .await
            .unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_stop_words_only_gives_zero_vector() {
        let provider = TrigramProvider::new(32);
        let embedding = provider.embed("what is the").await.unwrap();
        assert!(embedding.iter().all(|v| *v == 0.0));
    }
}
