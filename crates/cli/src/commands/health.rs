//! Health command handler.

use super::print_json;
use clap::Args;
use legalqa_core::{config::AppConfig, AppResult};
use legalqa_knowledge::{create_index, HealthReport};

/// Check the vector index and generation provider
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing health command");

        let index = create_index(config)?;
        let count = tokio::time::timeout(config.request_timeout(), index.count()).await;
        let (connected, entries) = match count {
            Ok(Ok(count)) => (true, count),
            Ok(Err(e)) => {
                tracing::warn!("Vector index unreachable: {}", e);
                (false, 0)
            }
            Err(_) => {
                tracing::warn!("Vector index did not answer in time");
                (false, 0)
            }
        };

        let report = HealthReport::new(connected, config.generation_configured(), entries);

        if self.json {
            return print_json(&report);
        }

        let describe = |ok: bool, yes: &'static str, no: &'static str| if ok { yes } else { no };
        println!("Status:            {}", report.status.as_str());
        println!(
            "Vector index:      {}",
            describe(report.vector_index_connected, "connected", "unreachable")
        );
        println!(
            "Generation:        {}",
            describe(report.generation_configured, "configured", "not configured")
        );
        println!("Knowledge entries: {}", report.knowledge_entries_loaded);

        Ok(())
    }
}
