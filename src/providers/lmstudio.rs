//! LM Studio provider implementation
//!
//! LM Studio uses the OpenAI-compatible API, so this adapter speaks the
//! shared OpenAI structures.

use super::http::UpstreamClient;
use super::openai_shared::{OpenAIMessage, OpenAIModelList, OpenAIRequest, OpenAIResponse};
use crate::config::{LMStudioConfig, ProviderConfig};
use crate::core_types::{ChatRequest, ChatResult, ModelDescriptor, ProviderAdapter, ProviderStatus};
use crate::error::BridgeResult;
use crate::logging::{log_debug, log_warn};
use async_trait::async_trait;
use std::time::Instant;

/// LM Studio local provider implementation
#[derive(Debug)]
pub struct LMStudioProvider {
    http_client: UpstreamClient,
    config: LMStudioConfig,
}

impl LMStudioProvider {
    /// Create a new LM Studio provider instance
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Configuration`](crate::BridgeError::Configuration)
    /// if the base URL is missing or invalid, or the HTTP client cannot be built.
    pub fn new(config: LMStudioConfig) -> BridgeResult<Self> {
        config.validate()?;

        log_debug!(
            provider = "lmstudio",
            base_url = %config.base_url,
            default_model = %config.default_model,
            "LM Studio provider initialized"
        );

        Ok(Self {
            http_client: UpstreamClient::new("LM Studio")?,
            config,
        })
    }

    async fn fetch_models(&self) -> BridgeResult<OpenAIModelList> {
        let url = format!("{}/v1/models", self.config.base_url);
        self.http_client
            .get_json(&url, &[], self.config.timeouts.status)
            .await
    }

    fn create_request(&self, request: &ChatRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: request.model_or(&self.config.default_model).to_string(),
            messages: request.messages.iter().map(OpenAIMessage::from).collect(),
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            stream: false,
        }
    }

    /// Parse LM Studio response into a ChatResult
    ///
    /// Missing choices yield empty content rather than an error.
    fn parse_response(&self, requested_model: &str, response: OpenAIResponse) -> ChatResult {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        ChatResult {
            provider: self.provider_id().to_string(),
            model: response
                .model
                .unwrap_or_else(|| requested_model.to_string()),
            content,
            usage: response.usage.map(Into::into),
            structured: None,
        }
    }
}

#[async_trait]
impl ProviderAdapter for LMStudioProvider {
    fn provider_id(&self) -> &str {
        "lmstudio"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn get_status(&self) -> ProviderStatus {
        match self.fetch_models().await {
            Ok(list) => ProviderStatus::online(
                self.provider_id(),
                self.base_url(),
                list.data.len(),
                list.data.first().map(|m| m.id.clone()),
            ),
            Err(e) => ProviderStatus::offline(self.provider_id(), self.base_url(), e.to_string()),
        }
    }

    async fn list_models(&self) -> Vec<ModelDescriptor> {
        match self.fetch_models().await {
            Ok(list) => list
                .data
                .into_iter()
                .map(|model| ModelDescriptor {
                    display_name: model.id.clone(),
                    id: model.id,
                    provider: "lmstudio".to_string(),
                    owned_by: model.owned_by,
                    size_bytes: None,
                })
                .collect(),
            Err(e) => {
                log_warn!(provider = "lmstudio", error = %e, "LM Studio listModels failed");
                Vec::new()
            }
        }
    }

    async fn chat(&self, request: &ChatRequest) -> BridgeResult<ChatResult> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = self.create_request(request);

        log_debug!(
            provider = "lmstudio",
            model = %body.model,
            message_count = body.messages.len(),
            "Executing chat request"
        );

        let start_time = Instant::now();
        let response: OpenAIResponse = self
            .http_client
            .post_json(&url, &[], &body, self.config.timeouts.chat)
            .await?;

        log_debug!(
            provider = "lmstudio",
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Chat request completed"
        );

        Ok(self.parse_response(&body.model, response))
    }
}
