//! Interaction log commands.

use super::print_json;
use clap::Args;
use legalqa_core::{config::AppConfig, AppResult};
use legalqa_knowledge::{AskResponse, InteractionLog};

/// Show recent interactions
#[derive(Args, Debug)]
pub struct LogsCommand {
    /// Maximum number of records
    #[arg(short, long, default_value = "50")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl LogsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing logs command");

        let log = InteractionLog::open(&config.storage.database_path)?;
        let records = log.list(self.limit).await?;

        if self.json {
            return print_json(&records);
        }

        if records.is_empty() {
            println!("No interactions logged yet");
            return Ok(());
        }

        for record in &records {
            let marker = if record.error_occurred { " [error]" } else { "" };
            println!(
                "#{} {} ({}ms){}",
                record.id,
                record.timestamp.to_rfc3339(),
                record.response_time_ms,
                marker
            );
            println!("  Q: {}", record.user_query);
            if !record.retrieved_faq_ids.is_empty() {
                println!("  Matched: {}", record.retrieved_faq_ids.join(", "));
            }
        }

        Ok(())
    }
}

/// Show the stored answer of a past interaction
#[derive(Args, Debug)]
pub struct ReplayCommand {
    /// Interaction id (from `logs`)
    pub id: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReplayCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing replay command for interaction {}", self.id);

        let log = InteractionLog::open(&config.storage.database_path)?;
        let answer = log.replay(self.id).await?;
        let response = AskResponse::from_answer(&answer, true);

        if self.json {
            return print_json(&response);
        }

        println!("{}", response.answer);
        for source in &response.sources {
            println!("- [{}] {:.2}", source.faq_id, source.similarity_score);
        }

        Ok(())
    }
}
