//! Ollama provider implementation
//!
//! Speaks Ollama's native API: `/api/tags` for the installed models,
//! `/api/ps` for models resident in memory, `/api/chat` for completions.

use super::http::UpstreamClient;
use crate::config::{OllamaConfig, ProviderConfig};
use crate::core_types::{
    ChatRequest, ChatResult, ModelDescriptor, ProviderAdapter, ProviderStatus, TokenUsage,
};
use crate::error::BridgeResult;
use crate::logging::{log_debug, log_warn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Ollama API chat request format
#[derive(Debug, Serialize, Clone)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Clone)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

/// Ollama API chat response format
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// `/api/tags` and `/api/ps` share this shape
#[derive(Debug, Deserialize, Default)]
struct OllamaModelList {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
    #[serde(default)]
    size: Option<u64>,
}

/// Ollama local provider implementation
#[derive(Debug)]
pub struct OllamaProvider {
    http_client: UpstreamClient,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Configuration`](crate::BridgeError::Configuration)
    /// if the base URL is missing or invalid, or the HTTP client cannot be built.
    pub fn new(config: OllamaConfig) -> BridgeResult<Self> {
        config.validate()?;

        log_debug!(
            provider = "ollama",
            base_url = %config.base_url,
            default_model = %config.default_model,
            "Ollama provider initialized"
        );

        Ok(Self {
            http_client: UpstreamClient::new("Ollama")?,
            config,
        })
    }

    async fn fetch_tags(&self) -> BridgeResult<OllamaModelList> {
        let url = format!("{}/api/tags", self.config.base_url);
        self.http_client
            .get_json(&url, &[], self.config.timeouts.status)
            .await
    }

    async fn fetch_running(&self) -> BridgeResult<OllamaModelList> {
        let url = format!("{}/api/ps", self.config.base_url);
        self.http_client
            .get_json(&url, &[], self.config.timeouts.status)
            .await
    }

    fn create_request(&self, request: &ChatRequest) -> OllamaChatRequest {
        OllamaChatRequest {
            model: request.model_or(&self.config.default_model).to_string(),
            messages: request
                .messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }

    fn parse_response(&self, requested_model: &str, response: OllamaChatResponse) -> ChatResult {
        let usage = match (response.prompt_eval_count, response.eval_count) {
            (None, None) => None,
            (prompt, completion) => Some(TokenUsage::new(
                prompt.unwrap_or(0),
                completion.unwrap_or(0),
            )),
        };

        ChatResult {
            provider: self.provider_id().to_string(),
            model: response
                .model
                .unwrap_or_else(|| requested_model.to_string()),
            content: response.message.map(|m| m.content).unwrap_or_default(),
            usage,
            structured: None,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OllamaProvider {
    fn provider_id(&self) -> &str {
        "ollama"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn get_status(&self) -> ProviderStatus {
        let (tags, running) = tokio::join!(self.fetch_tags(), self.fetch_running());

        let tags = match tags {
            Ok(tags) => tags,
            Err(e) => {
                return ProviderStatus::offline(self.provider_id(), self.base_url(), e.to_string())
            }
        };

        let running_models: Option<Vec<String>> = match running {
            Ok(list) => Some(list.models.into_iter().map(|m| m.name).collect()),
            Err(e) => {
                log_debug!(provider = "ollama", error = %e, "Could not read running models");
                None
            }
        };

        let loaded_model = running_models
            .as_ref()
            .and_then(|names| names.first().cloned());

        let mut status = ProviderStatus::online(
            self.provider_id(),
            self.base_url(),
            tags.models.len(),
            loaded_model,
        );
        status.running_models = running_models;
        status
    }

    async fn list_models(&self) -> Vec<ModelDescriptor> {
        match self.fetch_tags().await {
            Ok(list) => list
                .models
                .into_iter()
                .map(|model| ModelDescriptor {
                    display_name: model.name.clone(),
                    id: model.name,
                    provider: "ollama".to_string(),
                    owned_by: None,
                    size_bytes: model.size,
                })
                .collect(),
            Err(e) => {
                log_warn!(provider = "ollama", error = %e, "Ollama listModels failed");
                Vec::new()
            }
        }
    }

    async fn chat(&self, request: &ChatRequest) -> BridgeResult<ChatResult> {
        let url = format!("{}/api/chat", self.config.base_url);
        let body = self.create_request(request);

        log_debug!(
            provider = "ollama",
            model = %body.model,
            message_count = body.messages.len(),
            "Executing chat request"
        );

        let start_time = Instant::now();
        let response: OllamaChatResponse = self
            .http_client
            .post_json(&url, &[], &body, self.config.timeouts.chat)
            .await?;

        log_debug!(
            provider = "ollama",
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Chat request completed"
        );

        Ok(self.parse_response(&body.model, response))
    }
}
