//! Error types for the LegalQA service.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! provider, storage and request-pipeline failures. The pipeline variants
//! (`Validation`, `EmbeddingUnavailable`, `IndexUnavailable`,
//! `GenerationUnavailable`, `Logging`) form the request failure taxonomy;
//! only the first three ever reach a caller.

use thiserror::Error;

/// Unified error type for the LegalQA service.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Query rejected before any external call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream embedding call failed or timed out
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Vector index unreachable or timed out
    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    /// Generative model call failed (recovered by the fallback answer)
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// Interaction log write/read failed
    #[error("Logging failure: {0}")]
    Logging(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base and dataset errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether this error belongs to an upstream collaborator being down.
    pub fn is_upstream_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::EmbeddingUnavailable(_)
                | AppError::IndexUnavailable(_)
                | AppError::GenerationUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        assert!(AppError::EmbeddingUnavailable("quota".into()).is_upstream_unavailable());
        assert!(AppError::IndexUnavailable("refused".into()).is_upstream_unavailable());
        assert!(!AppError::Validation("empty".into()).is_upstream_unavailable());
        assert!(!AppError::Logging("disk full".into()).is_upstream_unavailable());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: AppError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
