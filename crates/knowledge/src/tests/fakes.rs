//! In-crate fakes for the pipeline's collaborators.

use crate::embeddings::EmbeddingProvider;
use crate::types::KnowledgeEntry;
use crate::vector_index::{IndexedEntry, ScoredEntry, SearchQuery, VectorIndex};
use legalqa_core::{AppError, AppResult};
use legalqa_llm::{Completion, CompletionRequest, LlmClient, TokenUsage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn entry(id: &str, question: &str, answer: &str, category: &str) -> KnowledgeEntry {
    KnowledgeEntry {
        id: id.to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
        category: category.to_string(),
        keywords: vec![],
    }
}

pub fn hit(id: &str, score: f32) -> ScoredEntry {
    ScoredEntry {
        entry: entry(
            id,
            &format!("question {}", id),
            &format!("answer {}", id),
            "General",
        ),
        score,
    }
}

#[derive(Debug)]
pub struct FakeEmbedder {
    vector: Vec<f32>,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn returning(vector: Vec<f32>) -> Self {
        Self {
            vector,
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(vec![0.0; 3])
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::returning(vec![1.0, 0.0, 0.0])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FakeEmbedder {
    fn provider_name(&self) -> &str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-embed"
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AppError::EmbeddingUnavailable(
                "quota exceeded".to_string(),
            ));
        }
        Ok(vec![self.vector.clone(); texts.len()])
    }
}

/// Index that returns a fixed hit list, regardless of the query.
pub struct FakeIndex {
    hits: Vec<ScoredEntry>,
    fail: bool,
    delay: Option<Duration>,
    searches: AtomicUsize,
    last_category: Mutex<Option<String>>,
}

impl FakeIndex {
    pub fn with_hits(hits: Vec<ScoredEntry>) -> Self {
        Self {
            hits,
            fail: false,
            delay: None,
            searches: AtomicUsize::new(0),
            last_category: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_hits(vec![])
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::with_hits(vec![hit("faq_001", 0.9)])
        }
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn last_category(&self) -> Option<String> {
        self.last_category.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl VectorIndex for FakeIndex {
    fn backend_name(&self) -> &str {
        "fake"
    }

    async fn ensure_collection(&self, _dimension: usize) -> AppResult<()> {
        Ok(())
    }

    async fn upsert(&self, _entries: &[IndexedEntry]) -> AppResult<()> {
        Ok(())
    }

    async fn search(&self, query: &SearchQuery<'_>) -> AppResult<Vec<ScoredEntry>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        *self.last_category.lock().unwrap() = query.category.map(str::to_string);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AppError::IndexUnavailable("connection refused".to_string()));
        }
        Ok(self.hits.clone())
    }

    async fn count(&self) -> AppResult<u64> {
        if self.fail {
            return Err(AppError::IndexUnavailable("connection refused".to_string()));
        }
        Ok(self.hits.len() as u64)
    }
}

/// Model client with a canned reply or failure.
pub struct FakeLlm {
    reply: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::replying("")
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying("too late")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for FakeLlm {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                model: request.model.clone(),
                usage: TokenUsage::default(),
                truncated: false,
            }),
            Err(message) => Err(AppError::Llm(message.clone())),
        }
    }
}
