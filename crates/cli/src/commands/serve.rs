//! Serve command handler.

use clap::Args;
use legalqa_core::{config::AppConfig, AppResult};
use legalqa_knowledge::build_pipeline;

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let mut server = config.server.clone();
        if let Some(bind) = &self.bind {
            server.bind = bind.clone();
        }

        let pipeline = build_pipeline(config).await?;
        legalqa_api::serve(&server, pipeline).await
    }
}
