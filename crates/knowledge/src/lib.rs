//! Legal FAQ knowledge base and ask pipeline.
//!
//! Provides the retrieval-augmented answering flow: embed the question,
//! retrieve the closest curated entries from a vector index, generate a
//! grounded answer (or fall back to the stored one) and log the exchange.

pub mod bootstrap;
pub mod dataset;
pub mod embeddings;
pub mod generation;
pub mod interaction_log;
pub mod memory_index;
pub mod pipeline;
pub mod qdrant;
pub mod retrieval;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use bootstrap::{build_pipeline, create_embedder, create_index, index_dataset};
pub use interaction_log::InteractionLog;
pub use pipeline::{validate_query, AskPipeline};
pub use types::{
    Answer, AskRequest, AskResponse, GenerationOutcome, HealthReport, HealthStatus, IndexStats,
    InteractionLogRecord, KnowledgeEntry, LogStats, RetrievedMatch, SourceRef,
};
pub use vector_index::VectorIndex;
