//! Test helper utilities for luxrig-bridge unit tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

#![allow(dead_code)]

use crate::aggregator::{Aggregator, ProviderRegistry};
use crate::core_types::{
    ChatMessage, ChatRequest, ChatResult, MockProviderAdapter, ModelDescriptor, ProviderAdapter,
    ProviderStatus,
};
use crate::error::{BridgeError, BridgeResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Deterministic in-memory adapter that counts its calls
pub struct StubAdapter {
    id: String,
    url: String,
    models: Vec<String>,
    online: bool,
    reply: String,
    pub status_calls: AtomicUsize,
    pub chat_calls: AtomicUsize,
}

impl StubAdapter {
    pub fn online(id: &str, models: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            url: format!("http://{id}.test"),
            models: models.iter().map(|m| m.to_string()).collect(),
            online: true,
            reply: "hello".to_string(),
            status_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
        }
    }

    pub fn offline(id: &str) -> Self {
        Self {
            online: false,
            ..Self::online(id, &[])
        }
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = reply.to_string();
        self
    }
}

#[async_trait]
impl ProviderAdapter for StubAdapter {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn base_url(&self) -> &str {
        &self.url
    }

    async fn get_status(&self) -> ProviderStatus {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.online {
            ProviderStatus::online(
                &self.id,
                &self.url,
                self.models.len(),
                self.models.first().cloned(),
            )
        } else {
            ProviderStatus::offline(&self.id, &self.url, "connection refused")
        }
    }

    async fn list_models(&self) -> Vec<ModelDescriptor> {
        if !self.online {
            return Vec::new();
        }
        self.models.iter().map(|m| descriptor(&self.id, m)).collect()
    }

    async fn chat(&self, request: &ChatRequest) -> BridgeResult<ChatResult> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        if !self.online {
            return Err(BridgeError::unavailable(
                &self.id,
                format!("{} is unreachable", self.id),
                None,
            ));
        }
        Ok(ChatResult {
            provider: self.id.clone(),
            model: request.model_or("default").to_string(),
            content: self.reply.clone(),
            usage: None,
            structured: None,
        })
    }
}

pub fn descriptor(provider: &str, id: &str) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        provider: provider.to_string(),
        display_name: id.to_string(),
        owned_by: None,
        size_bytes: None,
    }
}

/// Mock adapter that only answers identity calls
pub fn mock_adapter(id: &str) -> MockProviderAdapter {
    let mut mock = MockProviderAdapter::new();
    mock.expect_provider_id().return_const(id.to_string());
    mock.expect_base_url().return_const(format!("http://{id}.test"));
    mock
}

pub fn registry_of(adapters: Vec<Arc<dyn ProviderAdapter>>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for adapter in adapters {
        registry.register(adapter).expect("unique provider ids");
    }
    registry
}

pub fn aggregator_of(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Aggregator {
    Aggregator::new(registry_of(adapters))
}

pub fn user_request(provider: &str) -> ChatRequest {
    ChatRequest::new(provider, vec![ChatMessage::user("hi")])
}
