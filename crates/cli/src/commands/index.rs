//! Index command handler.

use super::print_json;
use clap::Args;
use legalqa_core::{config::AppConfig, AppResult};
use legalqa_knowledge::embeddings::verify_dimensions;
use legalqa_knowledge::{create_embedder, create_index, index_dataset};

/// Load the dataset into the vector index
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Re-embed and upsert even if the index already holds entries
    #[arg(long)]
    pub force: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command");
        tracing::debug!("Dataset: {:?}", config.storage.dataset_path);

        let embedder = create_embedder(config)?;
        verify_dimensions(embedder.as_ref(), config.embedding.dimension).await?;

        let index = create_index(config)?;
        let stats = index_dataset(config, embedder.as_ref(), index.as_ref(), self.force).await?;

        if self.json {
            return print_json(&stats);
        }

        if stats.skipped {
            println!("Index already populated; use --force to re-index");
        } else {
            println!(
                "Indexed {} entries in {:.1}s",
                stats.entries_indexed, stats.duration_secs
            );
        }

        Ok(())
    }
}
