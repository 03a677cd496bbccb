//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum query length in characters, after trimming.
pub const MAX_QUERY_CHARS: usize = 500;

/// A curated question/answer pair from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Unique, stable identifier (e.g. "faq_001")
    pub id: String,

    pub question: String,

    pub answer: String,

    /// Legal category (e.g. "Personal Injury")
    pub category: String,

    #[serde(default)]
    pub keywords: Vec<String>,
}

impl KnowledgeEntry {
    /// Text that is embedded for this entry.
    pub fn embedding_text(&self) -> &str {
        &self.question
    }
}

/// A knowledge entry paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedMatch {
    pub entry: KnowledgeEntry,

    /// Cosine similarity in [0, 1]
    pub score: f32,
}

impl RetrievedMatch {
    pub fn new(entry: KnowledgeEntry, score: f32) -> Self {
        Self {
            entry,
            score: score.clamp(0.0, 1.0),
        }
    }
}

/// How an answer's text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// The model produced text grounded on the matches
    Generated,
    /// The model failed; the top match's answer was returned verbatim
    Degraded,
    /// No match cleared the threshold; no model call was made
    NoContext,
}

impl GenerationOutcome {
    /// Whether the outcome must be logged with the error flag set.
    pub fn is_error(&self) -> bool {
        matches!(self, GenerationOutcome::Degraded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationOutcome::Generated => "generated",
            GenerationOutcome::Degraded => "degraded",
            GenerationOutcome::NoContext => "no_context",
        }
    }
}

/// Text returned by the generation stage together with its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub text: String,
    pub outcome: GenerationOutcome,
}

/// The response to one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,

    /// Matches used as grounding, best first
    pub sources: Vec<RetrievedMatch>,

    pub response_time_ms: u64,

    pub timestamp: DateTime<Utc>,

    pub outcome: GenerationOutcome,
}

/// Input to the ask pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,

    #[serde(default = "default_include_sources")]
    pub include_sources: bool,

    /// Restrict retrieval to one category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

fn default_include_sources() -> bool {
    true
}

impl AskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            include_sources: true,
            category: None,
        }
    }

    pub fn with_include_sources(mut self, include_sources: bool) -> Self {
        self.include_sources = include_sources;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A source as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub faq_id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub similarity_score: f32,
}

impl From<&RetrievedMatch> for SourceRef {
    fn from(m: &RetrievedMatch) -> Self {
        Self {
            faq_id: m.entry.id.clone(),
            question: m.entry.question.clone(),
            answer: m.entry.answer.clone(),
            category: m.entry.category.clone(),
            similarity_score: m.score,
        }
    }
}

/// Wire form of an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub response_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl AskResponse {
    /// Build the wire form, optionally hiding the sources.
    pub fn from_answer(answer: &Answer, include_sources: bool) -> Self {
        let sources = if include_sources {
            answer.sources.iter().map(SourceRef::from).collect()
        } else {
            Vec::new()
        };

        Self {
            answer: answer.text.clone(),
            sources,
            response_time_ms: answer.response_time_ms,
            timestamp: answer.timestamp,
        }
    }
}

/// One persisted query/response cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionLogRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub user_query: String,
    pub retrieved_faq_ids: Vec<String>,
    pub ai_response: String,
    pub response_time_ms: u64,
    pub relevance_scores: Vec<f32>,
    pub error_occurred: bool,

    /// Full matches, kept for replay
    #[serde(skip_serializing, default)]
    pub matches: Vec<RetrievedMatch>,
}

/// A record about to be appended to the interaction log.
#[derive(Debug, Clone)]
pub struct NewInteraction {
    pub user_query: String,
    pub matches: Vec<RetrievedMatch>,
    pub ai_response: String,
    pub response_time_ms: u64,
    pub error_occurred: bool,
}

/// Aggregate statistics over the interaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStats {
    pub total_queries: u64,

    /// Mean response time, rounded to two decimals
    pub avg_response_time_ms: f64,

    pub total_errors: u64,
}

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Readiness of the pipeline's collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub vector_index_connected: bool,
    pub generation_configured: bool,
    pub knowledge_entries_loaded: u64,
}

impl HealthReport {
    /// Derive the status from the individual checks.
    ///
    /// Unhealthy when the index is unreachable. Degraded when the index is
    /// empty or generation is not configured.
    pub fn new(
        vector_index_connected: bool,
        generation_configured: bool,
        knowledge_entries_loaded: u64,
    ) -> Self {
        let status = if !vector_index_connected {
            HealthStatus::Unhealthy
        } else if !generation_configured || knowledge_entries_loaded == 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            vector_index_connected,
            generation_configured,
            knowledge_entries_loaded,
        }
    }
}

/// Result of a dataset indexing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub entries_indexed: usize,
    pub skipped: bool,
    pub duration_secs: f64,
}
