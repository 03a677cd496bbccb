//! LegalQA CLI
//!
//! Main entry point for the legalqa command-line tool.
//! Serves the HTTP API and exposes the pipeline, dataset indexing and the
//! interaction log from the terminal.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    AskCommand, HealthCommand, IndexCommand, LogsCommand, ReplayCommand, ServeCommand,
    StatsCommand,
};
use legalqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// LegalQA - grounded answers to legal questions from a curated FAQ base
#[derive(Parser, Debug)]
#[command(name = "legalqa")]
#[command(about = "Grounded answers to legal questions from a curated FAQ base", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "LEGALQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Ask a legal question
    Ask(AskCommand),

    /// Load the dataset into the vector index
    Index(IndexCommand),

    /// Show recent interactions
    Logs(LogsCommand),

    /// Show the stored answer of a past interaction
    Replay(ReplayCommand),

    /// Show interaction statistics
    Stats(StatsCommand),

    /// Check the vector index and generation provider
    Health(HealthCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Serve(_) => "serve",
            Commands::Ask(_) => "ask",
            Commands::Index(_) => "index",
            Commands::Logs(_) => "logs",
            Commands::Replay(_) => "replay",
            Commands::Stats(_) => "stats",
            Commands::Health(_) => "health",
        }
    }

    /// Commands that only read the interaction log run without providers.
    fn reads_log_only(&self) -> bool {
        matches!(
            self,
            Commands::Logs(_) | Commands::Replay(_) | Commands::Stats(_)
        )
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, config file, then environment
    let config = AppConfig::load_from(cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.log_level, cli.verbose, cli.no_color, cli.log_json);

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.log_json, config.no_color)?;

    tracing::info!("LegalQA starting");
    tracing::debug!("Embedding: {} ({})", config.embedding.provider, config.embedding.model);
    tracing::debug!("Generation: {} ({})", config.generation.provider, config.generation.model);
    tracing::debug!("Vector index: {}", config.vector_index.backend);

    if !cli.command.reads_log_only() {
        config.validate()?;
    }

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Logs(cmd) => cmd.execute(&config).await,
        Commands::Replay(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Health(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
