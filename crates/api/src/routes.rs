//! Route handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Service information |
//! | `POST` | `/api/ask` | Answer a legal question |
//! | `GET`  | `/api/logs` | Recent interactions, newest first |
//! | `GET`  | `/api/logs/{id}/replay` | Stored answer of a past interaction |
//! | `GET`  | `/api/stats` | Interaction statistics |
//! | `GET`  | `/api/health` | Readiness of the index and the model |

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use legalqa_core::AppError;
use legalqa_knowledge::{AskRequest, AskResponse, HealthReport, InteractionLogRecord, LogStats};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_LOG_LIMIT: usize = 50;
const MAX_LOG_LIMIT: usize = 1000;

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Legal Q&A RAG System API",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/api/health",
    }))
}

pub async fn ask(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<AskResponse>> {
    let Json(request) =
        body.map_err(|e| ApiError(AppError::Validation(e.body_text())))?;

    let answer = state.pipeline.ask(&request).await?;
    Ok(Json(AskResponse::from_answer(
        &answer,
        request.include_sources,
    )))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    limit: Option<usize>,
}

pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Vec<InteractionLogRecord>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
    let records = state.pipeline.interaction_log().list(limit).await?;
    tracing::info!("Retrieved {} interaction logs", records.len());
    Ok(Json(records))
}

pub async fn replay(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AskResponse>> {
    let answer = state.pipeline.interaction_log().replay(id).await?;
    Ok(Json(AskResponse::from_answer(&answer, true)))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    log: LogStats,
    knowledge_entries_loaded: u64,
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let log = state.pipeline.interaction_log().stats().await?;
    let knowledge_entries_loaded = state.pipeline.entry_count().await?;
    Ok(Json(StatsResponse {
        log,
        knowledge_entries_loaded,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.pipeline.health().await)
}
