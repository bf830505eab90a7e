//! One-shot API endpoint tests using wiremock.
//!
//! These tests verify that the client calls the backend endpoints with
//! the right bodies and that the session reconciles responses into the
//! conversation.

use banter::client::{ApiClient, ApiError};
use banter::config::Config;
use banter::conversation::Role;
use banter::session::ChatSession;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Session wired to a mock server, with the stock defaults.
fn session_for(server: &MockServer) -> ChatSession {
    let config = Config {
        base_url: server.uri(),
        ..Config::default()
    };
    ChatSession::new(&config)
}

#[tokio::test]
async fn test_chat_round_trip_appends_both_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(serde_json::json!({
            "message": "2+2?",
            "model": "gpt-3.5-turbo",
            "temperature": 0.7,
            "max_tokens": 1024
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "4",
            "model_used": "gpt-3.5-turbo",
            "tokens_used": 5,
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    let reply = session.send("2+2?").await.expect("chat should succeed");

    assert_eq!(reply.content, "4");
    assert_eq!(reply.model_used, Some("gpt-3.5-turbo".to_string()));

    let messages = session.conversation().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "2+2?");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "4");
    assert_eq!(messages[1].model_used, Some("gpt-3.5-turbo".to_string()));
    assert!(messages[0].id < messages[1].id);
}

#[tokio::test]
async fn test_chat_server_error_leaves_only_user_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    let result = session.send("hello").await;

    match result {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("Internal Server Error"));
        }
        other => panic!("Expected ServerError, got {:?}", other.map(|m| m.content)),
    }

    // No assistant placeholder exists for the one-shot path
    assert_eq!(session.conversation().len(), 1);
    assert_eq!(session.conversation().last().unwrap().role, Role::User);
}

#[tokio::test]
async fn test_chat_validation_failure_makes_no_request() {
    let mock_server = MockServer::start().await;
    // No mocks mounted: any request would 404 and fail differently

    let mut session = session_for(&mock_server);
    let result = session.send("   ").await;

    assert!(matches!(result, Err(ApiError::InvalidRequest { .. })));
}

#[tokio::test]
async fn test_fetch_models() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [
                {"id": "gpt-3.5-turbo", "name": "GPT-3.5 Turbo",
                 "description": "Fast and efficient for most tasks", "max_tokens": 4096},
                {"id": "gpt-4o-mini", "name": "GPT-4",
                 "description": "More capable but slower", "max_tokens": 8192}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri());
    let listing = client.fetch_models().await.expect("models should load");

    assert_eq!(listing.models.len(), 2);
    assert_eq!(listing.models[0].id, "gpt-3.5-turbo");
    assert_eq!(listing.models[1].max_tokens, Some(8192));
}

#[tokio::test]
async fn test_status_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "operational",
            "openai_connected": true,
            "database_connected": true,
            "message": "All services are running normally",
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri());
    let status = client.status().await.expect("status should load");

    assert_eq!(status.status, "operational");
    assert!(status.openai_connected);
    assert_eq!(status.message, "All services are running normally");
}

#[tokio::test]
async fn test_health_check_true_on_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy",
            "service": "llm-practice-api"
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri());
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_false_on_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri());
    assert!(!client.health_check().await.unwrap());
}
