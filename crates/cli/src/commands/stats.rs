//! Stats command handler.
//!
//! Aggregates over the interaction log.

use super::print_json;
use clap::Args;
use legalqa_core::{config::AppConfig, AppResult};
use legalqa_knowledge::InteractionLog;

/// Show interaction statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let log = InteractionLog::open(&config.storage.database_path)?;
        let stats = log.stats().await?;

        if self.json {
            return print_json(&stats);
        }

        println!("Total queries:     {}", stats.total_queries);
        println!("Avg response time: {:.2}ms", stats.avg_response_time_ms);
        println!("Errors:            {}", stats.total_errors);

        Ok(())
    }
}
