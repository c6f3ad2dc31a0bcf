//! Core types for the provider-neutral bridge contract
//!
//! ## Organization
//! - `messages` - Chat request/result and conversation messages
//! - `status` - Provider status, model descriptors, snapshots
//! - `provider` - The `ProviderAdapter` trait

pub mod messages;
pub mod provider;
pub mod status;

pub use messages::{
    ChatMessage, ChatRequest, ChatResult, MessageRole, TokenUsage, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
pub use provider::ProviderAdapter;
pub use status::{
    AggregatedSnapshot, CpuMetrics, GpuMetrics, MemoryMetrics, ModelCatalog, ModelDescriptor,
    ProviderStatus, StreamEvent, SystemMetrics,
};

#[cfg(test)]
pub use provider::MockProviderAdapter;
