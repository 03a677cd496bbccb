//! SQLite-backed interaction log.
//!
//! Append-only table of query/response cycles. Every operation opens its
//! own connection on the blocking pool; concurrent writers are serialized
//! by SQLite's busy timeout.

use crate::types::{
    Answer, GenerationOutcome, InteractionLogRecord, LogStats, NewInteraction, RetrievedMatch,
};
use chrono::{DateTime, Utc};
use legalqa_core::{AppError, AppResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS interactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        user_query TEXT NOT NULL,
        retrieved_faq_ids TEXT NOT NULL,
        ai_response TEXT NOT NULL,
        response_time_ms INTEGER NOT NULL,
        relevance_scores TEXT NOT NULL,
        error_occurred BOOLEAN NOT NULL DEFAULT 0,
        matches TEXT NOT NULL DEFAULT '[]'
    );

    CREATE INDEX IF NOT EXISTS idx_interactions_timestamp ON interactions(timestamp);
"#;

const SELECT_COLUMNS: &str = "id, timestamp, user_query, retrieved_faq_ids, ai_response, \
     response_time_ms, relevance_scores, error_occurred, matches";

/// Persistent log of interactions.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    db_path: PathBuf,
}

impl InteractionLog {
    /// Open (and create if needed) the log database at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Logging(format!("Failed to create log directory: {}", e))
            })?;
        }

        let conn = connect(db_path)?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Logging(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Initialized interaction log at {:?}", db_path);
        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn with_connection<T, F>(&self, op: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = connect(&path)?;
            op(&conn)
        })
        .await
        .map_err(|e| AppError::Logging(format!("Log task failed: {}", e)))?
    }

    /// Append one interaction. Returns the new record id.
    pub async fn record(&self, interaction: NewInteraction) -> AppResult<i64> {
        let faq_ids: Vec<&str> = interaction
            .matches
            .iter()
            .map(|m| m.entry.id.as_str())
            .collect();
        let scores: Vec<f32> = interaction.matches.iter().map(|m| m.score).collect();

        let faq_ids_json = serde_json::to_string(&faq_ids)?;
        let scores_json = serde_json::to_string(&scores)?;
        let matches_json = serde_json::to_string(&interaction.matches)?;
        let timestamp = Utc::now().to_rfc3339();

        let id = self
            .with_connection(move |conn| {
                conn.execute(
                    "INSERT INTO interactions (timestamp, user_query, retrieved_faq_ids, \
                     ai_response, response_time_ms, relevance_scores, error_occurred, matches) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        timestamp,
                        interaction.user_query,
                        faq_ids_json,
                        interaction.ai_response,
                        interaction.response_time_ms as i64,
                        scores_json,
                        interaction.error_occurred,
                        matches_json,
                    ],
                )
                .map_err(|e| AppError::Logging(format!("Failed to insert interaction: {}", e)))?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        tracing::debug!("Logged interaction {}", id);
        Ok(id)
    }

    /// Most recent `limit` records, newest first.
    pub async fn list(&self, limit: usize) -> AppResult<Vec<InteractionLogRecord>> {
        self.with_connection(move |conn| {
            let sql = format!(
                "SELECT {} FROM interactions ORDER BY id DESC LIMIT ?1",
                SELECT_COLUMNS
            );
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| AppError::Logging(format!("Failed to prepare query: {}", e)))?;

            let rows = stmt
                .query_map(params![limit as i64], row_to_record)
                .map_err(|e| AppError::Logging(format!("Failed to query interactions: {}", e)))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| AppError::Logging(format!("Failed to read interaction: {}", e)))
        })
        .await
    }

    /// Fetch one record by id.
    pub async fn get(&self, id: i64) -> AppResult<InteractionLogRecord> {
        self.with_connection(move |conn| {
            let sql = format!("SELECT {} FROM interactions WHERE id = ?1", SELECT_COLUMNS);
            conn.query_row(&sql, params![id], row_to_record)
                .optional()
                .map_err(|e| AppError::Logging(format!("Failed to read interaction: {}", e)))?
                .ok_or_else(|| AppError::NotFound(format!("Interaction {} not found", id)))
        })
        .await
    }

    /// Reconstruct the answer originally returned for record `id`.
    pub async fn replay(&self, id: i64) -> AppResult<Answer> {
        let record = self.get(id).await?;
        replay_record(record)
    }

    /// Totals over the whole log.
    pub async fn stats(&self) -> AppResult<LogStats> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT COUNT(*), AVG(response_time_ms), \
                 SUM(CASE WHEN error_occurred THEN 1 ELSE 0 END) FROM interactions",
                [],
                |row| {
                    let total: i64 = row.get(0)?;
                    let avg: Option<f64> = row.get(1)?;
                    let errors: Option<i64> = row.get(2)?;
                    Ok(LogStats {
                        total_queries: total as u64,
                        avg_response_time_ms: (avg.unwrap_or(0.0) * 100.0).round() / 100.0,
                        total_errors: errors.unwrap_or(0) as u64,
                    })
                },
            )
            .map_err(|e| AppError::Logging(format!("Failed to compute stats: {}", e)))
        })
        .await
    }
}

fn connect(path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(path)
        .map_err(|e| AppError::Logging(format!("Failed to open interaction log: {}", e)))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| AppError::Logging(format!("Failed to set busy timeout: {}", e)))?;
    Ok(conn)
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<InteractionLogRecord> {
    let timestamp: String = row.get(1)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(InteractionLogRecord {
        id: row.get(0)?,
        timestamp,
        user_query: row.get(2)?,
        retrieved_faq_ids: json_column(row, 3)?,
        ai_response: row.get(4)?,
        response_time_ms: row.get::<_, i64>(5)?.max(0) as u64,
        relevance_scores: json_column(row, 6)?,
        error_occurred: row.get(7)?,
        matches: json_column::<Vec<RetrievedMatch>>(row, 8)?,
    })
}

/// Rebuild an answer from a stored record.
///
/// Records of failed requests (error flag set, no matches) carry no answer.
pub fn replay_record(record: InteractionLogRecord) -> AppResult<Answer> {
    let outcome = match (record.error_occurred, record.matches.is_empty()) {
        (true, true) => {
            return Err(AppError::NotFound(format!(
                "Interaction {} failed and has no answer to replay",
                record.id
            )))
        }
        (true, false) => GenerationOutcome::Degraded,
        (false, true) => GenerationOutcome::NoContext,
        (false, false) => GenerationOutcome::Generated,
    };

    Ok(Answer {
        text: record.ai_response,
        sources: record.matches,
        response_time_ms: record.response_time_ms,
        timestamp: record.timestamp,
        outcome,
    })
}
