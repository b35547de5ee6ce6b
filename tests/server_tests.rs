use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::net::TcpListener;

use calbot::agent::{Agent, AgentTurn};
use calbot::calendar::memory::InMemoryCalendar;
use calbot::chat::Orchestrator;
use calbot::error::AgentError;
use calbot::server::{router, AppState};

// ─── Scripted agent ───────────────────────────────────────────────────

/// Agent substitute replaying a fixed reply script; once the script runs
/// out it answers with the placeholder turn (empty system).
struct ScriptedAgent {
    replies: Mutex<VecDeque<Result<AgentTurn, AgentError>>>,
}

impl ScriptedAgent {
    fn new(replies: Vec<Result<AgentTurn, AgentError>>) -> Self {
        ScriptedAgent {
            replies: Mutex::new(replies.into()),
        }
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn send_turn(&self, _prompt: &str) -> Result<AgentTurn, AgentError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AgentTurn::placeholder()))
    }
}

fn turn(casual: &str, system: &str, intent: &str) -> Result<AgentTurn, AgentError> {
    let mut insight = serde_json::Map::new();
    insight.insert("intent".to_string(), Value::String(intent.to_string()));
    Ok(AgentTurn {
        casual: casual.to_string(),
        system: system.to_string(),
        insight,
    })
}

/// Bind the router on an ephemeral local port and serve it in the
/// background; returns the bound address.
async fn spawn_server(replies: Vec<Result<AgentTurn, AgentError>>) -> SocketAddr {
    let agent = Arc::new(ScriptedAgent::new(replies));
    let calendar = Arc::new(InMemoryCalendar::new());
    let orchestrator = Arc::new(Orchestrator::new(agent, calendar));
    let app = router(AppState::new(orchestrator));

    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// ============================================================
// Liveness
// ============================================================

#[tokio::test]
async fn test_health_reports_healthy_with_timestamp() {
    let addr = spawn_server(vec![]).await;

    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

// ============================================================
// Chat route
// ============================================================

#[tokio::test]
async fn test_chat_returns_sanitized_reply_shape() {
    let addr = spawn_server(vec![turn("Hi! What do you need?", "", "greeting")]).await;

    let response = reqwest::get(format!("http://{addr}/chat/hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["metadata", "response", "role"]);
    assert_eq!(body["role"], "assistant");
    assert_eq!(body["response"], "Hi! What do you need?");
    assert_eq!(body["metadata"]["processed_commands"], 0);
    assert_eq!(body["metadata"]["last_intent"], "greeting");
}

#[tokio::test]
async fn test_chat_runs_commands_against_the_calendar() {
    let addr = spawn_server(vec![
        turn("Checking...", "list_events({})", "list"),
        turn("Here's your schedule.", "", "list"),
    ])
    .await;

    let response = reqwest::get(format!("http://{addr}/chat/am%20I%20free"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["metadata"]["processed_commands"], 1);
    assert!(body["response"].as_str().unwrap().contains("You're totally free"));
}

// ============================================================
// Failure translation
// ============================================================

#[tokio::test]
async fn test_agent_connectivity_failure_is_a_generic_500() {
    let addr = spawn_server(vec![Err(AgentError::Http(
        "Connection refused (os error 111)".to_string(),
    ))])
    .await;

    let response = reqwest::get(format!("http://{addr}/chat/hello"))
        .await
        .unwrap();
    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "system");
    assert_eq!(body["response"], "Calendar services are temporarily unavailable");
    assert_eq!(body["metadata"]["error_type"], "internal");
    // No error detail leaks into the body.
    assert!(!body.to_string().contains("os error"));
}

#[tokio::test]
async fn test_other_agent_failures_get_the_generic_message() {
    let addr = spawn_server(vec![Err(AgentError::Http(
        "HTTP 500 from upstream".to_string(),
    ))])
    .await;

    let response = reqwest::get(format!("http://{addr}/chat/hello"))
        .await
        .unwrap();
    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["response"], "Something went wrong");
}
