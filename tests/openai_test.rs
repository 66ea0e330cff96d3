//! Wiremock integration tests for OpenAiClient.
//!
//! These tests verify correct HTTP interaction and error handling using mocked responses.
#![cfg(feature = "openai")]

use std::sync::Arc;
use std::time::Duration;

use augur::providers::OpenAiClient;
use augur::{AugurError, ChatModel, ChatOptions, Classifier, Credentials, LabelSet, Message};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 42, "completion_tokens": 17, "total_tokens": 59}
    })
}

/// Test successful chat request.
#[tokio::test]
async fn test_chat_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test_key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "temperature": 0.0,
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("hi!")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("test_key", mock_server.uri());
    let response = client
        .chat(&[Message::user("hello")], &ChatOptions::default())
        .await
        .expect("chat should succeed");

    assert_eq!(response.content, "hi!");
    assert_eq!(response.model.as_deref(), Some("gpt-4o-mini-2024-07-18"));
    let usage = response.usage.expect("usage should be present");
    assert_eq!(usage.prompt_tokens, 42);
    assert_eq!(usage.total_tokens, 59);
}

/// End-to-end: classifier over the HTTP client.
#[tokio::test]
async fn test_classify_through_http() {
    let mock_server = MockServer::start().await;
    let answer = r#"{"intent":"order_status","confidence":0.88,"rationale":"asks about a parcel"}"#;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(answer)))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("test_key", mock_server.uri());
    let classifier = Classifier::new(Arc::new(client));
    let result = classifier
        .classify("where is my parcel?", "concise", &LabelSet::default())
        .await
        .unwrap();

    assert_eq!(result.intent, "order_status");
    assert_eq!(result.confidence, 0.88);
    assert_eq!(result.raw, answer);
}

/// A null message content is treated as empty text and falls back.
#[tokio::test]
async fn test_null_content_falls_back() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "length"}]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("test_key", mock_server.uri());
    let result = Classifier::new(Arc::new(client))
        .classify("hi", "concise", &LabelSet::default())
        .await
        .unwrap();
    assert!(result.is_fallback());
}

/// Test empty choices returns EmptyResponse.
#[tokio::test]
async fn test_empty_choices() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("test_key", mock_server.uri());
    let result = client
        .chat(&[Message::user("hello")], &ChatOptions::default())
        .await;

    assert!(
        matches!(result, Err(AugurError::EmptyResponse)),
        "expected EmptyResponse, got {:?}",
        result
    );
}

/// Test 401 Unauthorized returns AuthenticationFailed error.
#[tokio::test]
async fn test_error_401_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("bad_key", mock_server.uri());
    let result = client
        .chat(&[Message::user("hello")], &ChatOptions::default())
        .await;

    assert!(
        matches!(result, Err(AugurError::AuthenticationFailed)),
        "expected AuthenticationFailed, got {:?}",
        result
    );
}

/// Test 404 Not Found returns ModelNotFound error.
#[tokio::test]
async fn test_error_404_model_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("test_key", mock_server.uri());
    let result = client
        .chat(&[Message::user("hello")], &ChatOptions::new("gpt-9"))
        .await;

    match result {
        Err(AugurError::ModelNotFound(m)) => assert_eq!(m, "gpt-9"),
        other => panic!("expected ModelNotFound, got {:?}", other),
    }
}

/// Test 429 Too Many Requests returns RateLimited error with retry-after.
#[tokio::test]
async fn test_error_429_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("test_key", mock_server.uri());
    let result = client
        .chat(&[Message::user("hello")], &ChatOptions::default())
        .await;

    match result {
        Err(AugurError::RateLimited { retry_after }) => {
            assert_eq!(
                retry_after,
                Some(Duration::from_secs(30)),
                "retry_after should be 30 seconds"
            );
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

/// Provider error bodies surface their message.
#[tokio::test]
async fn test_error_400_uses_body_message() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({
        "error": {"message": "Invalid value for 'temperature'", "type": "invalid_request_error"}
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("test_key", mock_server.uri());
    let result = client
        .chat(&[Message::user("hello")], &ChatOptions::default().temperature(9.0))
        .await;

    match result {
        Err(AugurError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("temperature"));
        }
        other => panic!("expected Api {{ status: 400 }}, got {:?}", other),
    }
}

/// Transport errors from the client are not turned into fallbacks.
#[tokio::test]
async fn test_classify_propagates_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("test_key", mock_server.uri());
    let result = Classifier::new(Arc::new(client))
        .classify("hi", "concise", &LabelSet::default())
        .await;

    match result {
        Err(AugurError::Api { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected Api {{ status: 503 }}, got {:?}", other),
    }
}

/// Slow servers hit the configured timeout.
#[tokio::test]
async fn test_timeout_is_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url("test_key", mock_server.uri())
        .timeout(Duration::from_millis(50));
    let result = client
        .chat(&[Message::user("hello")], &ChatOptions::default())
        .await;

    assert!(
        matches!(result, Err(AugurError::Http(_))),
        "expected Http, got {:?}",
        result
    );
}

#[test]
fn test_from_credentials_requires_key() {
    let result = OpenAiClient::from_credentials(&Credentials::default());
    assert!(matches!(result, Err(AugurError::MissingCredential(_))));
}

#[test]
fn test_from_credentials_uses_base_url() {
    let credentials = Credentials {
        api_key: Some("k".to_string()),
        base_url: Some("http://localhost:11434/v1".to_string()),
    };
    let client = OpenAiClient::from_credentials(&credentials).unwrap();
    assert_eq!(client.base_url(), "http://localhost:11434/v1");

    let client = OpenAiClient::from_credentials(&Credentials {
        base_url: None,
        ..credentials
    })
    .unwrap();
    assert_eq!(client.base_url(), "https://api.openai.com/v1");
}
