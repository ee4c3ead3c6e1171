//! HTTP Server - chat and agent completion routes

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use taai_core::{ChatCompletionRequest, ChatCompletionResponse};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// Run the HTTP server until it fails
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("TAAI server starting on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    let cors = state.cors;
    let state = Arc::new(state);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/chat-completion", post(chat_handler))
        .route("/api/agent", post(agent_handler))
        .route("/agent-completion", post(agent_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "cache_entries": state.chat.cache().len(),
    }))
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Json<ChatCompletionResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.chat.complete(&request).await?;
    Ok(Json(ChatCompletionResponse { response }))
}

async fn agent_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Json<ChatCompletionResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    tracing::info!("Agent request via {}", state.agent.name());
    let response = state.agent.assist(&request.message, &request.history).await;
    Ok(Json(ChatCompletionResponse { response }))
}
