//! Answer generation backends for LegalQA.
//!
//! One non-streaming completion per call, behind the [`LlmClient`] trait.
//! Failures are always reported as errors; deciding how to degrade is the
//! caller's job.
//!
//! Supported backends:
//! - `openai`: `/v1/chat/completions`
//! - `ollama`: `/api/generate`
//!
//! ```no_run
//! use legalqa_llm::{create_client, CompletionRequest};
//! use std::time::Duration;
//!
//! # async fn example() -> legalqa_core::AppResult<()> {
//! let client = create_client("ollama", None, None, Duration::from_secs(30))?;
//! let request = CompletionRequest::new("llama3.2", "What is a tort?");
//! let completion = client.complete(&request).await?;
//! println!("{}", completion.text);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

pub use client::{Completion, CompletionRequest, LlmClient, TokenUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
