//! Test helper utilities for luxrig-bridge integration tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use luxrig_bridge::config::{GeminiConfig, LMStudioConfig, OllamaConfig, ProviderTimeouts};
use luxrig_bridge::{ChatMessage, ChatRequest};
use std::time::Duration;

/// Short timeouts so failure tests finish quickly
pub fn test_timeouts() -> ProviderTimeouts {
    ProviderTimeouts {
        status: Duration::from_millis(500),
        chat: Duration::from_secs(2),
    }
}

pub fn lmstudio_config(base_url: &str) -> LMStudioConfig {
    LMStudioConfig {
        base_url: base_url.to_string(),
        default_model: "local-model".to_string(),
        timeouts: test_timeouts(),
    }
}

pub fn ollama_config(base_url: &str) -> OllamaConfig {
    OllamaConfig {
        base_url: base_url.to_string(),
        default_model: "llama2".to_string(),
        timeouts: test_timeouts(),
    }
}

pub fn gemini_config(base_url: &str) -> GeminiConfig {
    GeminiConfig {
        api_key: Some("test-gemini-key".to_string()),
        base_url: base_url.to_string(),
        default_model: "gemini-pro".to_string(),
        timeouts: test_timeouts(),
        ..GeminiConfig::default()
    }
}

/// Base URL of a local port with nothing listening on it
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn hi_request(provider: &str) -> ChatRequest {
    ChatRequest::new(provider, vec![ChatMessage::user("hi")])
}
