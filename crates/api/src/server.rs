//! Axum router and server lifecycle.

use crate::routes;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use legalqa_core::{config::ServerConfig, AppResult};
use legalqa_knowledge::AskPipeline;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AskPipeline>,
}

impl AppState {
    pub fn new(pipeline: AskPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/ask", post(routes::ask))
        .route("/logs", get(routes::logs))
        .route("/logs/{id}/replay", get(routes::replay))
        .route("/stats", get(routes::stats))
        .route("/health", get(routes::health));

    Router::new()
        .route("/", get(routes::root))
        .nest("/api", api)
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(server: &ServerConfig, pipeline: AskPipeline) -> AppResult<()> {
    let app = build_router(AppState::new(pipeline), server);

    let listener = tokio::net::TcpListener::bind(&server.bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
