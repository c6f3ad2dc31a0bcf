//! Provider adapter trait
//!
//! Defines the `ProviderAdapter` trait that every upstream integration
//! implements. The aggregator only ever talks to providers through it, so
//! adding a provider means registering a new adapter.

use crate::core_types::messages::{ChatRequest, ChatResult};
use crate::core_types::status::{ModelDescriptor, ProviderStatus};
use crate::error::BridgeResult;
use async_trait::async_trait;

/// Common contract for one upstream AI provider.
///
/// `get_status` and `list_models` are total: they fold every failure into
/// their return value. Only `chat` reports errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable registry key, e.g. "lmstudio"
    fn provider_id(&self) -> &str;

    /// Base URL of the upstream, for status reporting
    fn base_url(&self) -> &str;

    /// Query upstream health. Never fails; offline is a valid answer.
    async fn get_status(&self) -> ProviderStatus;

    /// List upstream models. Failures degrade to an empty list.
    async fn list_models(&self) -> Vec<ModelDescriptor>;

    /// Run a single chat completion attempt.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Upstream`](crate::BridgeError::Upstream) for non-2xx responses
    /// - [`BridgeError::Unavailable`](crate::BridgeError::Unavailable) for connection failures and timeouts
    /// - [`BridgeError::ResponseParsing`](crate::BridgeError::ResponseParsing) for undecodable bodies
    async fn chat(&self, request: &ChatRequest) -> BridgeResult<ChatResult>;
}
