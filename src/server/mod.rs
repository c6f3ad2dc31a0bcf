//! HTTP and WebSocket surface of the bridge
//!
//! ```text
//! GET  /                  service info
//! GET  /status            aggregated snapshot
//! GET  /models            providerId -> models
//! POST /chat              route one chat request
//! GET  /llm/models        models plus total
//! POST /llm/chat          alias of /chat
//! GET  /llm/detect        first provider with models
//! POST /status/broadcast  push a snapshot now
//! GET  /system            host metrics
//! GET  /system/gpu        GPU metrics
//! GET  /stream            WebSocket status feed
//! ```

mod error;
pub mod routes;
pub mod state;
pub mod stream;

pub use state::AppState;

use crate::config::BridgeConfig;
use crate::logging::{log_info, log_warn};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the bridge router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/status", get(routes::status))
        .route("/status/broadcast", post(routes::broadcast_now))
        .route("/models", get(routes::models))
        .route("/chat", post(routes::chat))
        .route("/llm/models", get(routes::llm_models))
        .route("/llm/chat", post(routes::chat))
        .route("/llm/detect", get(routes::llm_detect))
        .route("/system", get(routes::system))
        .route("/system/gpu", get(routes::system_gpu))
        .route("/stream", get(stream::stream))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the bridge until Ctrl-C
pub async fn serve(config: BridgeConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let state = AppState::from_config(config)?;
    let broadcaster = state.broadcaster.clone();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log_info!(
        address = %addr,
        providers = ?state.aggregator.registry().ids(),
        "LuxRig bridge listening"
    );

    broadcaster.start();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    broadcaster.shutdown().await;
    Ok(())
}

pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log_warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    log_info!("Shutdown signal received");
}
