//! Shared foundations for the LegalQA workspace.
//!
//! [`AppError`] is the one error type every crate returns, [`AppConfig`] the
//! one configuration struct, and [`logging::init_logging`] sets up tracing
//! for the binary.

pub mod config;
pub mod error;
pub mod logging;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
