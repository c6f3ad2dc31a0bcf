//! Provider registry and aggregation service
//!
//! The [`ProviderRegistry`] maps provider ids to adapters; dispatch is a map
//! lookup, so adding a provider means registering one more adapter. The
//! [`Aggregator`] fans status and model queries out concurrently and routes
//! chat requests to exactly one adapter.

use crate::config::BridgeConfig;
use crate::core_types::{
    AggregatedSnapshot, ChatRequest, ChatResult, ModelCatalog, ModelDescriptor, ProviderAdapter,
};
use crate::error::{BridgeError, BridgeResult};
use crate::logging::{log_debug, log_info, log_warn};
use crate::providers::{GeminiProvider, LMStudioProvider, OllamaProvider};
use crate::response_parser::ResponseParser;
use crate::system::SystemMonitor;
use chrono::Utc;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

/// Provider id → adapter
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    adapters: BTreeMap<String, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry for every configured provider
    ///
    /// LM Studio and Ollama are always registered; Gemini only when an API
    /// key is configured.
    pub fn from_config(config: &BridgeConfig) -> BridgeResult<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(LMStudioProvider::new(config.lmstudio.clone())?))?;
        registry.register(Arc::new(OllamaProvider::new(config.ollama.clone())?))?;
        if let Some(gemini) = &config.gemini {
            registry.register(Arc::new(GeminiProvider::new(gemini.clone())?))?;
        }

        log_info!(providers = ?registry.ids(), "Provider registry ready");
        Ok(registry)
    }

    /// Add an adapter under its own provider id
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Configuration`] when the id is already taken.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) -> BridgeResult<()> {
        let id = adapter.provider_id().to_string();
        if self.adapters.contains_key(&id) {
            return Err(BridgeError::configuration(format!(
                "provider '{id}' is registered twice"
            )));
        }
        self.adapters.insert(id, adapter);
        Ok(())
    }

    pub fn get(&self, provider_id: &str) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.get(provider_id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    fn adapters(&self) -> impl Iterator<Item = &Arc<dyn ProviderAdapter>> {
        self.adapters.values()
    }
}

/// Status aggregation, model discovery, and chat routing
pub struct Aggregator {
    registry: ProviderRegistry,
    system: Option<Arc<SystemMonitor>>,
}

impl Aggregator {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            system: None,
        }
    }

    /// Include host metrics in every snapshot
    pub fn with_system_monitor(mut self, monitor: Arc<SystemMonitor>) -> Self {
        self.system = Some(monitor);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Query every provider concurrently
    ///
    /// Never fails: an unreachable provider shows up as an offline entry.
    pub async fn aggregated_status(&self) -> AggregatedSnapshot {
        let statuses = join_all(self.registry.adapters().map(|a| a.get_status()));
        let (statuses, system) = match &self.system {
            Some(monitor) => {
                let (statuses, metrics) = tokio::join!(statuses, monitor.metrics());
                (statuses, Some(metrics))
            }
            None => (statuses.await, None),
        };

        let snapshot = AggregatedSnapshot {
            timestamp: Utc::now(),
            services: statuses
                .into_iter()
                .map(|s| (s.provider_id.clone(), s))
                .collect(),
            system,
            agents: Vec::new(),
        };

        log_debug!(
            services = snapshot.services.len(),
            online = snapshot.online_count(),
            "Aggregated provider status"
        );
        snapshot
    }

    /// Route a chat request to the named provider
    ///
    /// # Errors
    ///
    /// - [`BridgeError::UnknownProvider`] when no adapter has that id
    /// - [`BridgeError::InvalidRequest`] for an empty conversation or
    ///   out-of-range sampling parameters
    /// - any adapter error, passed through unchanged
    pub async fn route_chat(&self, request: &ChatRequest) -> BridgeResult<ChatResult> {
        let adapter = self
            .registry
            .get(&request.provider)
            .ok_or_else(|| BridgeError::unknown_provider(&request.provider))?;

        validate_chat_request(request)?;

        let start_time = Instant::now();
        let mut result = adapter.chat(request).await?;

        if request.expect_json {
            result.structured = ResponseParser::parse_llm_output(&result.content);
        }

        log_info!(
            provider = %result.provider,
            model = %result.model,
            duration_ms = start_time.elapsed().as_millis() as u64,
            structured = result.structured.is_some(),
            "Chat routed"
        );
        Ok(result)
    }

    /// Every provider's models, concurrently; failures become empty lists
    pub async fn list_all_models(&self) -> ModelCatalog {
        let lists = join_all(self.registry.adapters().map(|adapter| async move {
            (adapter.provider_id().to_string(), adapter.list_models().await)
        }))
        .await;

        lists.into_iter().collect()
    }
}

fn validate_chat_request(request: &ChatRequest) -> BridgeResult<()> {
    if request.messages.is_empty() {
        return Err(BridgeError::invalid_request("messages must not be empty"));
    }
    if !request.temperature.is_finite() || !TEMPERATURE_RANGE.contains(&request.temperature) {
        return Err(BridgeError::invalid_request(format!(
            "temperature must be between 0 and 2, got {}",
            request.temperature
        )));
    }
    if request.max_tokens == 0 {
        return Err(BridgeError::invalid_request(
            "maxTokens must be greater than zero",
        ));
    }
    Ok(())
}

/// First provider in `priority` order with at least one model
///
/// Providers missing from `priority` are tried afterwards in id order.
pub fn select_first_available<'a>(
    catalog: &'a ModelCatalog,
    priority: &[String],
) -> Option<(&'a str, &'a [ModelDescriptor])> {
    let preferred = priority.iter().filter_map(|id| catalog.get_key_value(id));
    let rest = catalog
        .iter()
        .filter(|(id, _)| !priority.iter().any(|p| p == *id));

    let found = preferred
        .chain(rest)
        .find(|(_, models)| !models.is_empty())
        .map(|(id, models)| (id.as_str(), models.as_slice()));

    if found.is_none() {
        log_warn!("No provider reported any models");
    }
    found
}
