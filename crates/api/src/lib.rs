//! HTTP surface of the LegalQA service.

pub mod error;
pub mod routes;
pub mod server;

#[cfg(test)]
mod tests;

pub use error::{ApiError, ApiResult};
pub use server::{build_router, serve, AppState};
