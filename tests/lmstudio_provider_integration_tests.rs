//! Integration Tests for the LM Studio Adapter
//!
//! UNIT UNDER TEST: LMStudioProvider against a mocked OpenAI-compatible API
//!
//! BUSINESS RESPONSIBILITY:
//!   - Report LM Studio health from `GET /v1/models` without ever failing
//!   - List the models LM Studio can serve
//!   - Send one chat completion per request and normalize the reply
//!   - Surface upstream HTTP errors and unreachable servers distinctly
//!
//! TEST COVERAGE:
//!   - Online/offline status including HTTP 500 and malformed JSON
//!   - Model listing degrades to empty on failure
//!   - Chat round-trip, default model, empty choices
//!   - Upstream error, connection refused, and timeout mapping

mod common;

use common::{hi_request, lmstudio_config, unreachable_url};
use luxrig_bridge::{BridgeError, LMStudioProvider, ProviderAdapter};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn models_body() -> serde_json::Value {
    json!({
        "object": "list",
        "data": [
            {"id": "qwen2.5-7b-instruct", "object": "model", "owned_by": "organization_owner"},
            {"id": "phi-3-mini", "object": "model", "owned_by": "organization_owner"}
        ]
    })
}

async fn provider_for(server: &MockServer) -> LMStudioProvider {
    LMStudioProvider::new(lmstudio_config(&server.uri())).expect("valid config")
}

// ============================================================================
// Status Tests
// ============================================================================

#[tokio::test]
async fn test_status_online_reports_model_count_and_first_model() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(models_body()))
        .mount(&server)
        .await;
    let provider = provider_for(&server).await;

    // Act
    let status = provider.get_status().await;

    // Assert
    assert!(status.online);
    assert_eq!(status.provider_id, "lmstudio");
    assert_eq!(status.model_count, 2);
    assert_eq!(status.loaded_model.as_deref(), Some("qwen2.5-7b-instruct"));
    assert!(status.error.is_none());
}

#[tokio::test]
async fn test_status_with_empty_model_list_is_online() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let status = provider_for(&server).await.get_status().await;

    assert!(status.online);
    assert_eq!(status.model_count, 0);
    assert!(status.loaded_model.is_none());
}

#[tokio::test]
async fn test_status_http_500_is_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let status = provider_for(&server).await.get_status().await;

    assert!(!status.online);
    assert_eq!(status.model_count, 0);
    assert!(status.error.unwrap().contains("500"));
}

#[tokio::test]
async fn test_status_malformed_json_is_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let status = provider_for(&server).await.get_status().await;

    assert!(!status.online);
    assert!(status.error.unwrap().contains("Malformed response"));
}

#[tokio::test]
async fn test_status_connection_refused_is_offline() {
    let provider = LMStudioProvider::new(lmstudio_config(&unreachable_url())).unwrap();

    let status = provider.get_status().await;

    assert!(!status.online);
    assert!(status.error.unwrap().contains("LM Studio"));
}

// ============================================================================
// Model Listing Tests
// ============================================================================

#[tokio::test]
async fn test_list_models_maps_descriptors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(models_body()))
        .mount(&server)
        .await;

    let models = provider_for(&server).await.list_models().await;

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].id, "qwen2.5-7b-instruct");
    assert_eq!(models[0].provider, "lmstudio");
    assert_eq!(models[0].owned_by.as_deref(), Some("organization_owner"));
}

#[tokio::test]
async fn test_list_models_failure_is_empty() {
    let provider = LMStudioProvider::new(lmstudio_config(&unreachable_url())).unwrap();
    assert!(provider.list_models().await.is_empty());
}

// ============================================================================
// Chat Tests
// ============================================================================

#[tokio::test]
async fn test_chat_round_trip() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "m",
            "messages": [{"role": "user", "content": "hi"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "m",
            "choices": [{"message": {"content": "hello"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let provider = provider_for(&server).await;

    // Act
    let result = provider
        .chat(&hi_request("lmstudio").with_model("m"))
        .await
        .unwrap();

    // Assert
    assert_eq!(result.provider, "lmstudio");
    assert_eq!(result.model, "m");
    assert_eq!(result.content, "hello");
    assert!(result.usage.is_none());
}

#[tokio::test]
async fn test_chat_uses_default_model_and_reports_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "local-model",
            "temperature": 0.7,
            "max_tokens": 2000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })))
        .mount(&server)
        .await;

    let result = provider_for(&server)
        .await
        .chat(&hi_request("lmstudio"))
        .await
        .unwrap();

    assert_eq!(result.model, "local-model");
    let usage = result.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 10);
    assert_eq!(usage.total_tokens, 15);
}

#[tokio::test]
async fn test_chat_empty_choices_is_empty_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let result = provider_for(&server)
        .await
        .chat(&hi_request("lmstudio"))
        .await
        .unwrap();

    assert_eq!(result.content, "");
}

#[tokio::test]
async fn test_chat_upstream_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'x' not found"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .await
        .chat(&hi_request("lmstudio").with_model("x"))
        .await
        .unwrap_err();

    match err {
        BridgeError::Upstream {
            provider,
            status,
            body,
        } => {
            assert_eq!(provider, "LM Studio");
            assert_eq!(status, 404);
            assert_eq!(body, "model 'x' not found");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_connection_refused_is_unavailable() {
    let provider = LMStudioProvider::new(lmstudio_config(&unreachable_url())).unwrap();

    let err = provider.chat(&hi_request("lmstudio")).await.unwrap_err();

    assert!(matches!(err, BridgeError::Unavailable { .. }));
    assert!(err.to_string().starts_with("LM Studio is unreachable"));
}

#[tokio::test]
async fn test_chat_timeout_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .await
        .chat(&hi_request("lmstudio"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Unavailable { .. }));
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let err = LMStudioProvider::new(lmstudio_config("localhost:1234")).unwrap_err();
    assert!(matches!(err, BridgeError::Configuration { .. }));
}
