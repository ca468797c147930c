//! Wire-format tests for the Anthropic backend.
//!
//! Verifies the headers and body sent to the messages endpoint and how error
//! replies are classified, against a local wiremock server.

use luthier_core::{CompletionRequest, Error, ImageContent, InferenceBackend};
use luthier_inference::{AnthropicBackend, AnthropicConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> AnthropicBackend {
    let config = AnthropicConfig {
        base_url: server.uri(),
        api_key: Some("sk-ant-test".to_string()),
        model: "claude-test".to_string(),
        timeout_seconds: 10,
        ..Default::default()
    };
    AnthropicBackend::new(config).expect("Failed to create backend")
}

fn text_reply(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-test",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 10, "output_tokens": 5}
    })
}

#[tokio::test]
async fn test_headers_and_body_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "model": "claude-test",
            "max_tokens": 4096,
            "system": "You are a guitar identification API."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("{\"guitars\":[]}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let reply = backend
        .complete(
            CompletionRequest::new("Extract all guitars", 4096)
                .with_system("You are a guitar identification API."),
        )
        .await;

    assert_eq!(reply.unwrap(), "{\"guitars\":[]}");
}

#[tokio::test]
async fn test_images_precede_prompt_and_model_override_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_partial_json(json!({
            "model": "claude-vision",
            "max_tokens": 256,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "image", "source": {"type": "base64", "media_type": "image/jpeg", "data": "AAAA"}},
                    {"type": "text", "text": "Read the headstock"}
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("{\"brand_read\":\"Nash\"}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let request = CompletionRequest::new("Read the headstock", 256)
        .with_images(vec![ImageContent {
            media_type: "image/jpeg".to_string(),
            data: "AAAA".to_string(),
        }])
        .with_model("claude-vision");

    let reply = backend.complete(request).await.unwrap();
    assert!(reply.contains("Nash"));
}

#[tokio::test]
async fn test_401_is_config_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server)
        .complete(CompletionRequest::new("hi", 10))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("Authentication failed"));
}

#[tokio::test]
async fn test_529_overloaded_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        })))
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server)
        .complete(CompletionRequest::new("hi", 10))
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert!(err.to_string().contains("Overloaded"));
}

#[tokio::test]
async fn test_non_json_error_body_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server)
        .complete(CompletionRequest::new("hi", 10))
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn test_error_inside_success_body_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"type": "api_error", "message": "Internal server error"}
        })))
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server)
        .complete(CompletionRequest::new("hi", 10))
        .await
        .unwrap_err();

    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_empty_content_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "stop_reason": "max_tokens"
        })))
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server)
        .complete(CompletionRequest::new("hi", 10))
        .await
        .unwrap_err();

    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_unreachable_service_is_upstream_error() {
    let config = AnthropicConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: Some("sk-ant-test".to_string()),
        timeout_seconds: 2,
        ..Default::default()
    };
    let backend = AnthropicBackend::new(config).unwrap();

    let err = backend
        .complete(CompletionRequest::new("hi", 10))
        .await
        .unwrap_err();
    assert!(err.is_upstream());
}
