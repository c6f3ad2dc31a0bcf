//! Google Gemini provider implementation
//!
//! Talks to the Generative Language API. The API key travels as the `key`
//! query parameter and is never logged.

use super::http::UpstreamClient;
use crate::config::{GeminiConfig, ProviderConfig};
use crate::core_types::{
    ChatMessage, ChatRequest, ChatResult, MessageRole, ModelDescriptor, ProviderAdapter,
    ProviderStatus, TokenUsage,
};
use crate::error::{BridgeError, BridgeResult};
use crate::logging::{log_debug, log_warn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize, Default)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl GeminiModel {
    fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    fn can_chat(&self) -> bool {
        self.supported_generation_methods.is_empty()
            || self
                .supported_generation_methods
                .iter()
                .any(|m| m == "generateContent")
    }
}

/// Google Gemini cloud provider implementation
#[derive(Debug)]
pub struct GeminiProvider {
    http_client: UpstreamClient,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Configuration`] if the API key is missing, the
    /// base URL is invalid, or the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> BridgeResult<Self> {
        config.validate()?;

        log_debug!(
            provider = "gemini",
            base_url = %config.base_url,
            default_model = %config.default_model,
            "Gemini provider initialized"
        );

        Ok(Self {
            http_client: UpstreamClient::new("Gemini")?,
            config,
        })
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    async fn fetch_models(&self) -> BridgeResult<Vec<GeminiModel>> {
        let url = format!("{}/models", self.config.base_url);
        let list: GeminiModelList = self
            .http_client
            .get_json(&url, &[("key", self.api_key())], self.config.timeouts.status)
            .await?;
        Ok(list.models.into_iter().filter(GeminiModel::can_chat).collect())
    }

    /// Map conversation messages onto Gemini contents.
    ///
    /// System turns become the system instruction; assistant turns use the
    /// `model` role. Order of the remaining turns is preserved.
    fn create_request(&self, request: &ChatRequest) -> GeminiRequest {
        let system_text: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(to_gemini_content)
            .collect();

        let system_instruction = (!system_text.is_empty()).then(|| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: system_text.join("\n\n"),
            }],
        });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    fn parse_response(&self, model: &str, response: GeminiResponse) -> ChatResult {
        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        ChatResult {
            provider: self.provider_id().to_string(),
            model: model.to_string(),
            content,
            usage: response
                .usage_metadata
                .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count)),
            structured: None,
        }
    }
}

fn to_gemini_content(message: &ChatMessage) -> GeminiContent {
    let role = match message.role {
        MessageRole::Assistant => "model",
        _ => "user",
    };
    GeminiContent {
        role: Some(role.to_string()),
        parts: vec![GeminiPart {
            text: message.content.clone(),
        }],
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn get_status(&self) -> ProviderStatus {
        match self.fetch_models().await {
            Ok(models) => ProviderStatus::online(
                self.provider_id(),
                self.base_url(),
                models.len(),
                Some(self.config.default_model.clone()),
            ),
            Err(e) => ProviderStatus::offline(self.provider_id(), self.base_url(), e.to_string()),
        }
    }

    async fn list_models(&self) -> Vec<ModelDescriptor> {
        match self.fetch_models().await {
            Ok(models) => models
                .into_iter()
                .map(|model| ModelDescriptor {
                    id: model.short_name().to_string(),
                    display_name: model
                        .display_name
                        .clone()
                        .unwrap_or_else(|| model.short_name().to_string()),
                    provider: "gemini".to_string(),
                    owned_by: Some("google".to_string()),
                    size_bytes: None,
                })
                .collect(),
            Err(e) => {
                log_warn!(provider = "gemini", error = %e, "Gemini listModels failed");
                Vec::new()
            }
        }
    }

    async fn chat(&self, request: &ChatRequest) -> BridgeResult<ChatResult> {
        let requested = request.model_or(&self.config.default_model);
        let model = requested.strip_prefix("models/").unwrap_or(requested);
        let body = self.create_request(request);

        if body.contents.is_empty() {
            return Err(BridgeError::invalid_request(
                "Gemini needs at least one user or assistant message",
            ));
        }

        let url = format!("{}/models/{}:generateContent", self.config.base_url, model);

        log_debug!(
            provider = "gemini",
            model = %model,
            message_count = body.contents.len(),
            "Executing chat request"
        );

        let start_time = Instant::now();
        let response: GeminiResponse = self
            .http_client
            .post_json(&url, &[("key", self.api_key())], &body, self.config.timeouts.chat)
            .await?;

        log_debug!(
            provider = "gemini",
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Chat request completed"
        );

        Ok(self.parse_response(model, response))
    }
}
