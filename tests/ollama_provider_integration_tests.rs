//! Integration Tests for the Ollama Adapter
//!
//! UNIT UNDER TEST: OllamaProvider against a mocked Ollama API
//!
//! BUSINESS RESPONSIBILITY:
//!   - Report installed and resident models from `/api/tags` and `/api/ps`
//!   - Send chats to `/api/chat` with sampling options mapped to Ollama's names
//!   - Surface an unreachable Ollama as a provider-named failure
//!
//! TEST COVERAGE:
//!   - Status with and without `/api/ps` support
//!   - Model sizes carried into descriptors
//!   - Chat request mapping and eval-count usage
//!   - Offline and upstream-error behavior

mod common;

use common::{hi_request, ollama_config, unreachable_url};
use luxrig_bridge::{BridgeError, ChatMessage, ChatRequest, OllamaProvider, ProviderAdapter};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tags_body() -> serde_json::Value {
    json!({
        "models": [
            {"name": "llama2:latest", "size": 3825819519u64},
            {"name": "mistral:7b", "size": 4109865159u64}
        ]
    })
}

async fn mount_tags(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_status_reports_running_models() {
    // Arrange
    let server = MockServer::start().await;
    mount_tags(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/ps"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"models": [{"name": "mistral:7b", "size": 5137025024u64}]})),
        )
        .mount(&server)
        .await;
    let provider = OllamaProvider::new(ollama_config(&server.uri())).unwrap();

    // Act
    let status = provider.get_status().await;

    // Assert
    assert!(status.online);
    assert_eq!(status.model_count, 2);
    assert_eq!(status.loaded_model.as_deref(), Some("mistral:7b"));
    assert_eq!(status.running_models, Some(vec!["mistral:7b".to_string()]));
}

#[tokio::test]
async fn test_status_online_when_ps_unsupported() {
    let server = MockServer::start().await;
    mount_tags(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/ps"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let provider = OllamaProvider::new(ollama_config(&server.uri())).unwrap();

    let status = provider.get_status().await;

    assert!(status.online);
    assert_eq!(status.model_count, 2);
    assert!(status.loaded_model.is_none());
    assert!(status.running_models.is_none());
}

#[tokio::test]
async fn test_status_offline_when_unreachable() {
    let provider = OllamaProvider::new(ollama_config(&unreachable_url())).unwrap();

    let status = provider.get_status().await;

    assert!(!status.online);
    assert_eq!(status.provider_id, "ollama");
    assert!(status.error.unwrap().contains("Ollama"));
}

#[tokio::test]
async fn test_list_models_includes_sizes() {
    let server = MockServer::start().await;
    mount_tags(&server).await;
    let provider = OllamaProvider::new(ollama_config(&server.uri())).unwrap();

    let models = provider.list_models().await;

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].id, "llama2:latest");
    assert_eq!(models[0].provider, "ollama");
    assert_eq!(models[0].size_bytes, Some(3825819519));
}

#[tokio::test]
async fn test_chat_maps_options_and_usage() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "mistral:7b",
            "stream": false,
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ],
            "options": {"temperature": 0.2, "num_predict": 64}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mistral:7b",
            "message": {"role": "assistant", "content": "hey"},
            "done": true,
            "prompt_eval_count": 12,
            "eval_count": 3
        })))
        .expect(1)
        .mount(&server)
        .await;
    let provider = OllamaProvider::new(ollama_config(&server.uri())).unwrap();

    let mut request = ChatRequest::new(
        "ollama",
        vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
    )
    .with_model("mistral:7b");
    request.temperature = 0.2;
    request.max_tokens = 64;

    // Act
    let result = provider.chat(&request).await.unwrap();

    // Assert
    assert_eq!(result.provider, "ollama");
    assert_eq!(result.model, "mistral:7b");
    assert_eq!(result.content, "hey");
    let usage = result.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 12);
    assert_eq!(usage.completion_tokens, 3);
    assert_eq!(usage.total_tokens, 15);
}

#[tokio::test]
async fn test_chat_defaults_model_when_blank() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"model": "llama2"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"role": "assistant", "content": "ok"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let provider = OllamaProvider::new(ollama_config(&server.uri())).unwrap();

    let result = provider
        .chat(&hi_request("ollama").with_model(""))
        .await
        .unwrap();

    assert_eq!(result.model, "llama2");
    assert!(result.usage.is_none());
}

#[tokio::test]
async fn test_chat_unreachable_mentions_ollama() {
    let provider = OllamaProvider::new(ollama_config(&unreachable_url())).unwrap();

    let err = provider.chat(&hi_request("ollama")).await.unwrap_err();

    assert!(matches!(err, BridgeError::Unavailable { .. }));
    assert!(err.to_string().contains("Ollama"));
    assert_eq!(err.http_status(), 502);
}

#[tokio::test]
async fn test_chat_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'nope' not found"})),
        )
        .mount(&server)
        .await;
    let provider = OllamaProvider::new(ollama_config(&server.uri())).unwrap();

    let err = provider
        .chat(&hi_request("ollama").with_model("nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Upstream { status: 404, .. }));
    assert!(err.to_string().contains("not found"));
}
