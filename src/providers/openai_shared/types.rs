//! OpenAI-compatible data structures and types
//!
//! Contains the request/response structures used by OpenAI-compatible providers.

use crate::core_types::{ChatMessage, TokenUsage};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible message structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

impl From<&ChatMessage> for OpenAIMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

/// Choice in OpenAI response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message in OpenAI response choice
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAIResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Usage information in OpenAI response
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct OpenAIUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<OpenAIUsage> for TokenUsage {
    fn from(usage: OpenAIUsage) -> Self {
        if usage.total_tokens == 0 {
            return TokenUsage::new(usage.prompt_tokens, usage.completion_tokens);
        }
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

/// `GET /v1/models` response
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OpenAIModelList {
    #[serde(default)]
    pub data: Vec<OpenAIModel>,
}

/// Entry in the OpenAI model list
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAIModel {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub owned_by: Option<String>,
}
