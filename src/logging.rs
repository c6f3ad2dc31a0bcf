//! Logging utilities for luxrig-bridge
//!
//! Re-exports tracing macros with log_* naming convention so every module
//! logs with the same vocabulary. The binary installs the subscriber.

pub use tracing::{debug as log_debug, error as log_error, info as log_info, warn as log_warn};

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG`; falls back to `default_filter` when unset or invalid.
/// Safe to call more than once (later calls are ignored).
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
