//! # luxrig-bridge
//!
//! Aggregation bridge that puts local and cloud AI providers (LM Studio,
//! Ollama, Google Gemini) behind one HTTP and WebSocket API.
//!
//! ## Key Features
//!
//! - **Provider registry**: adapters keyed by provider id; dispatch is a lookup
//! - **Aggregated status**: concurrent health checks that never fail as a whole
//! - **Uniform chat**: one request/result shape for every provider
//! - **Live status feed**: periodic and on-demand snapshots over WebSocket
//! - **Filesystem bridge**: directory listing and file opening for the browser
//!
//! ## Example
//!
//! ```rust,no_run
//! use luxrig_bridge::{Aggregator, BridgeConfig, ChatMessage, ChatRequest, ProviderRegistry};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = BridgeConfig::from_env()?;
//! let aggregator = Aggregator::new(ProviderRegistry::from_config(&config)?);
//!
//! let snapshot = aggregator.aggregated_status().await;
//! println!("{} providers online", snapshot.online_count());
//!
//! let request = ChatRequest::new("ollama", vec![ChatMessage::user("Hello!")]);
//! let result = aggregator.route_chat(&request).await?;
//! println!("{}", result.content);
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

pub mod core_types;

// Logging utilities (re-exports tracing with log_* naming)
pub mod logging;

pub mod aggregator;
pub mod broadcaster;
pub mod config;
pub mod error;
pub mod fs_bridge;
pub mod providers;
pub mod response_parser;
pub mod server;
pub mod system;

#[cfg(test)]
pub mod tests;

pub use aggregator::{select_first_available, Aggregator, ProviderRegistry};
pub use broadcaster::{Broadcaster, SubscriberState, Subscription};
pub use config::{BridgeConfig, GeminiConfig, LMStudioConfig, OllamaConfig, ProviderConfig};
pub use error::{BridgeError, BridgeResult};
pub use providers::{GeminiProvider, LMStudioProvider, OllamaProvider};
pub use system::SystemMonitor;

pub use core_types::{
    AggregatedSnapshot, ChatMessage, ChatRequest, ChatResult, MessageRole, ModelCatalog,
    ModelDescriptor, ProviderAdapter, ProviderStatus, StreamEvent, SystemMetrics, TokenUsage,
};
