//! Status, model discovery, and snapshot types
//!
//! Everything here is recomputed from live upstream queries on every call;
//! none of it is cached or persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time health of one upstream provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub provider_id: String,
    pub online: bool,
    pub base_url: String,
    pub model_count: usize,
    pub loaded_model: Option<String>,
    pub error: Option<String>,
    /// Models currently resident in memory, for providers that report it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_models: Option<Vec<String>>,
}

impl ProviderStatus {
    pub fn online(
        provider_id: impl Into<String>,
        base_url: impl Into<String>,
        model_count: usize,
        loaded_model: Option<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            online: true,
            base_url: base_url.into(),
            model_count,
            loaded_model,
            error: None,
            running_models: None,
        }
    }

    pub fn offline(
        provider_id: impl Into<String>,
        base_url: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            online: false,
            base_url: base_url.into(),
            model_count: 0,
            loaded_model: None,
            error: Some(error.into()),
            running_models: None,
        }
    }
}

/// A model an upstream provider can serve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub id: String,
    pub provider: String,
    pub display_name: String,
    pub owned_by: Option<String>,
    pub size_bytes: Option<u64>,
}

/// Models grouped by provider id
pub type ModelCatalog = BTreeMap<String, Vec<ModelDescriptor>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuMetrics {
    pub name: Option<String>,
    pub cores: usize,
    /// Global utilization in percent
    pub utilization: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryMetrics {
    #[serde(rename = "totalGB")]
    pub total_gb: f64,
    #[serde(rename = "usedGB")]
    pub used_gb: f64,
    pub percent_used: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuMetrics {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization: Option<f64>,
    #[serde(
        rename = "memoryUsedGB",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub memory_used_gb: Option<f64>,
    #[serde(
        rename = "memoryTotalGB",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub memory_total_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_draw: Option<f64>,
}

impl GpuMetrics {
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Host metrics folded into the status snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub gpu: GpuMetrics,
    pub uptime_seconds: u64,
    pub hostname: Option<String>,
}

/// Full, non-incremental status payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSnapshot {
    pub timestamp: DateTime<Utc>,
    pub services: BTreeMap<String, ProviderStatus>,
    pub system: Option<SystemMetrics>,
    /// Agent runners are not managed by the bridge; always empty
    #[serde(default)]
    pub agents: Vec<serde_json::Value>,
}

impl AggregatedSnapshot {
    pub fn online_count(&self) -> usize {
        self.services.values().filter(|s| s.online).count()
    }
}

/// Message pushed over the `/stream` WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum StreamEvent {
    Status(AggregatedSnapshot),
}
