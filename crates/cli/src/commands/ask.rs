//! Ask command handler.
//!
//! Runs one question through the full pipeline, including the interaction
//! log, without starting the HTTP server.

use super::print_json;
use clap::Args;
use legalqa_core::{config::AppConfig, AppError, AppResult};
use legalqa_knowledge::{build_pipeline, AskRequest, AskResponse};
use std::path::PathBuf;

/// Ask a legal question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "query")]
    pub file: Option<PathBuf>,

    /// Restrict retrieval to one category
    #[arg(long)]
    pub category: Option<String>,

    /// Hide the matched entries
    #[arg(long)]
    pub no_sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let query = self.get_query()?;
        let mut request = AskRequest::new(query).with_include_sources(!self.no_sources);
        if let Some(category) = &self.category {
            request = request.with_category(category.clone());
        }

        let pipeline = build_pipeline(config).await?;
        let answer = pipeline.ask(&request).await?;
        let response = AskResponse::from_answer(&answer, request.include_sources);

        if self.json {
            return print_json(&response);
        }

        println!("{}", response.answer);
        if !response.sources.is_empty() {
            println!();
            println!("Sources:");
            for source in &response.sources {
                println!(
                    "- [{}] {} ({}, relevance {:.2})",
                    source.faq_id, source.question, source.category, source.similarity_score
                );
            }
        }
        tracing::debug!(
            "Answered in {}ms ({})",
            answer.response_time_ms,
            answer.outcome.as_str()
        );

        Ok(())
    }

    fn get_query(&self) -> AppResult<String> {
        if let Some(query) = &self.query {
            return Ok(query.clone());
        }
        match &self.file {
            Some(path) => Ok(std::fs::read_to_string(path)?),
            None => Err(AppError::Validation("No question provided".to_string())),
        }
    }
}
