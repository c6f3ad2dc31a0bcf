//! Shared handler state

use crate::aggregator::{Aggregator, ProviderRegistry};
use crate::broadcaster::Broadcaster;
use crate::config::BridgeConfig;
use crate::error::BridgeResult;
use crate::system::SystemMonitor;
use std::sync::Arc;

/// Everything a request handler needs; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub broadcaster: Arc<Broadcaster>,
    pub system: Arc<SystemMonitor>,
    pub config: Arc<BridgeConfig>,
}

impl AppState {
    /// Wire up the registry, aggregator, monitor, and broadcaster from config
    pub fn from_config(config: BridgeConfig) -> BridgeResult<Self> {
        let registry = ProviderRegistry::from_config(&config)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Same as [`AppState::from_config`] but with a caller-built registry
    pub fn with_registry(config: BridgeConfig, registry: ProviderRegistry) -> Self {
        let system = Arc::new(SystemMonitor::new());
        let aggregator =
            Arc::new(Aggregator::new(registry).with_system_monitor(Arc::clone(&system)));
        let broadcaster = Arc::new(Broadcaster::new(
            Arc::clone(&aggregator),
            config.broadcast_interval,
        ));

        Self {
            aggregator,
            broadcaster,
            system,
            config: Arc::new(config),
        }
    }
}
