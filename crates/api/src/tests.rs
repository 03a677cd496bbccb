//! Route tests against an offline pipeline.

use crate::error::GENERIC_FAILURE;
use crate::server::{build_router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use legalqa_core::{AppConfig, AppError, AppResult};
use legalqa_knowledge::bootstrap::{create_generator, create_index};
use legalqa_knowledge::embeddings::EmbeddingProvider;
use legalqa_knowledge::retrieval::Retriever;
use legalqa_knowledge::{build_pipeline, AskPipeline, InteractionLog};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn offline_config(temp: &TempDir) -> AppConfig {
    let dataset = temp.path().join("legal_faqs.json");
    std::fs::write(
        &dataset,
        json!({"faqs": [
            {"id": "faq_001",
             "question": "What is the statute of limitations for personal injury lawsuits?",
             "answer": "Usually two to three years from the date of injury.",
             "category": "Personal Injury"},
            {"id": "faq_002",
             "question": "Can my landlord keep my security deposit?",
             "answer": "Only for unpaid rent or damage beyond normal wear and tear.",
             "category": "Landlord-Tenant"}
        ]})
        .to_string(),
    )
    .unwrap();

    let mut config = AppConfig::default();
    config.embedding.provider = "trigram".to_string();
    config.embedding.dimension = 256;
    config.generation.provider = "none".to_string();
    config.vector_index.backend = "memory".to_string();
    config.retrieval.similarity_threshold = 0.3;
    config.storage.dataset_path = dataset;
    config.storage.database_path = temp.path().join("interactions.db");
    config
}

async fn offline_app(temp: &TempDir) -> Router {
    let config = offline_config(temp);
    let pipeline = build_pipeline(&config).await.unwrap();
    build_router(AppState::new(pipeline), &config.server)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_ask_returns_answer_with_sources() {
    let temp = TempDir::new().unwrap();
    let app = offline_app(&temp).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/ask",
            json!({"query": "What is the statute of limitations for personal injury lawsuits?"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["answer"]
        .as_str()
        .unwrap()
        .contains("Usually two to three years"));
    assert_eq!(body["sources"][0]["faq_id"], "faq_001");
    assert_eq!(body["sources"][0]["category"], "Personal Injury");
    assert!(body["sources"][0]["similarity_score"].as_f64().unwrap() <= 1.0);
    assert!(body["response_time_ms"].is_u64());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_ask_without_sources() {
    let temp = TempDir::new().unwrap();
    let app = offline_app(&temp).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/ask",
            json!({"query": "Can my landlord keep my security deposit?", "include_sources": false}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"], json!([]));

    let (_, logs) = send(&app, get("/api/logs")).await;
    assert_eq!(logs[0]["retrieved_faq_ids"], json!(["faq_002"]));
}

#[tokio::test]
async fn test_ask_rejects_overlong_query() {
    let temp = TempDir::new().unwrap();
    let app = offline_app(&temp).await;

    let (status, body) = send(
        &app,
        post_json("/api/ask", json!({"query": "a".repeat(501)})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("500"));

    let (_, logs) = send(&app, get("/api/logs")).await;
    assert_eq!(logs, json!([]));
}

#[tokio::test]
async fn test_ask_rejects_malformed_body() {
    let temp = TempDir::new().unwrap();
    let app = offline_app(&temp).await;

    let (status, body) = send(&app, post_json("/api/ask", json!({"question": "hi"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_logs_newest_first_with_limit() {
    let temp = TempDir::new().unwrap();
    let app = offline_app(&temp).await;

    for query in ["first question", "second question", "third question"] {
        let (status, _) = send(&app, post_json("/api/ask", json!({ "query": query }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, logs) = send(&app, get("/api/logs?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["user_query"], "third question");
    assert_eq!(logs[1]["user_query"], "second question");
    assert!(logs[0].get("matches").is_none());
}

#[tokio::test]
async fn test_replay_returns_original_answer() {
    let temp = TempDir::new().unwrap();
    let app = offline_app(&temp).await;

    let (_, answered) = send(
        &app,
        post_json(
            "/api/ask",
            json!({"query": "Can my landlord keep my security deposit?"}),
        ),
    )
    .await;
    let (_, logs) = send(&app, get("/api/logs")).await;
    let id = logs[0]["id"].as_i64().unwrap();

    let (status, replayed) = send(&app, get(&format!("/api/logs/{}/replay", id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(replayed["answer"], answered["answer"]);
    assert_eq!(replayed["sources"], answered["sources"]);
}

#[tokio::test]
async fn test_replay_unknown_id() {
    let temp = TempDir::new().unwrap();
    let app = offline_app(&temp).await;

    let (status, body) = send(&app, get("/api/logs/9999/replay")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_stats_and_health() {
    let temp = TempDir::new().unwrap();
    let app = offline_app(&temp).await;

    send(&app, post_json("/api/ask", json!({"query": "security deposit"}))).await;

    let (status, stats) = send(&app, get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_queries"], 1);
    assert_eq!(stats["knowledge_entries_loaded"], 2);

    let (status, health) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    // No generation provider configured
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["vector_index_connected"], true);
    assert_eq!(health["generation_configured"], false);
    assert_eq!(health["knowledge_entries_loaded"], 2);
}

#[tokio::test]
async fn test_root() {
    let temp = TempDir::new().unwrap();
    let app = offline_app(&temp).await;

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["health"], "/api/health");
}

#[derive(Debug)]
struct UnreachableEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for UnreachableEmbedder {
    fn provider_name(&self) -> &str {
        "unreachable"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        256
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::EmbeddingUnavailable(
            "connection refused: http://10.0.0.1/v1/embeddings".to_string(),
        ))
    }
}

#[tokio::test]
async fn test_upstream_failure_is_503_with_generic_detail() {
    let temp = TempDir::new().unwrap();
    let config = offline_config(&temp);

    let pipeline = AskPipeline::new(
        Arc::new(UnreachableEmbedder),
        Retriever::new(create_index(&config).unwrap(), &config.retrieval),
        create_generator(&config).unwrap(),
        InteractionLog::open(&config.storage.database_path).unwrap(),
        config.request_timeout(),
    );
    let app = build_router(AppState::new(pipeline), &config.server);

    let (status, body) = send(
        &app,
        post_json("/api/ask", json!({"query": "What is probate?"})),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], GENERIC_FAILURE);

    let (_, logs) = send(&app, get("/api/logs")).await;
    assert_eq!(logs[0]["error_occurred"], true);
    assert_eq!(logs[0]["ai_response"], "");
    assert!(!logs.to_string().contains("10.0.0.1"));
}
