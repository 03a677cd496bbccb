//! Command handlers for the LegalQA CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod health;
pub mod index;
pub mod logs;
pub mod serve;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use health::HealthCommand;
pub use index::IndexCommand;
pub use logs::{LogsCommand, ReplayCommand};
pub use serve::ServeCommand;
pub use stats::StatsCommand;

use legalqa_core::{AppError, AppResult};
use serde::Serialize;

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
