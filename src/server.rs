//! HTTP boundary for the chat loop.
//!
//! `GET /chat/{text}` runs one full conversation loop and returns the
//! sanitized reply; `GET /health` is the liveness probe. An unrecoverable
//! agent failure becomes a generic 500 body -- a connectivity-flavored
//! message when the underlying error looks like a connection problem, a
//! generic one otherwise. No error detail or collaborator payload is ever
//! included.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::chat::Orchestrator;
use crate::error::AgentError;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        AppState { orchestrator }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat/:text", get(chat))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "chat server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn chat(
    State(state): State<AppState>,
    Path(text): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.orchestrator.handle_message(&text).await {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(body) => (StatusCode::OK, Json(body)),
            Err(e) => internal_error(&AgentError::Http(e.to_string())),
        },
        Err(e) => internal_error(&e),
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Build the generic internal-error body. The message distinguishes a
/// connectivity flavor from everything else by inspecting the error text;
/// the text itself is never sent to the client.
fn internal_error(error: &AgentError) -> (StatusCode, Json<Value>) {
    tracing::error!(error = %error, "unrecoverable failure in chat request");
    let message = if error.to_string().to_lowercase().contains("connection") {
        "Calendar services are temporarily unavailable"
    } else {
        "Something went wrong"
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "role": "system",
            "response": message,
            "metadata": { "error_type": "internal" },
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_errors_get_the_unavailable_message() {
        let err = AgentError::Http("Connection refused (os error 111)".to_string());
        let (status, Json(body)) = internal_error(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["response"], "Calendar services are temporarily unavailable");
        assert_eq!(body["metadata"]["error_type"], "internal");
    }

    #[test]
    fn other_errors_get_the_generic_message() {
        let err = AgentError::Http("HTTP 500 from upstream".to_string());
        let (_, Json(body)) = internal_error(&err);
        assert_eq!(body["response"], "Something went wrong");
        assert_eq!(body["role"], "system");
    }
}
