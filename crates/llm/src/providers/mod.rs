//! Generation backends.

pub mod ollama;
pub mod openai;

pub use ollama::{OllamaClient, DEFAULT_OLLAMA_URL};
pub use openai::{OpenAiClient, DEFAULT_OPENAI_URL};

use legalqa_core::{AppError, AppResult};
use std::time::Duration;

/// HTTP client shared by both backends.
fn http_client(provider: &str, timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Llm(format!("Failed to create HTTP client for {}: {}", provider, e)))
}

/// Turn a non-2xx response into an error carrying the status and body.
async fn status_error(provider: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    AppError::Llm(format!("{} returned {}: {}", provider, status, body.trim()))
}
