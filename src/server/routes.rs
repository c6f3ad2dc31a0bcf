//! REST handlers
//!
//! Each handler is a thin mapping onto one aggregator, broadcaster, or
//! monitor call.

use super::state::AppState;
use crate::aggregator::select_first_available;
use crate::core_types::{AggregatedSnapshot, ChatRequest, ChatResult, GpuMetrics, SystemMetrics};
use crate::error::BridgeError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Map, Value};

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "LuxRig Bridge",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "providers": state.aggregator.registry().ids(),
        "endpoints": {
            "status": "/status",
            "models": "/models",
            "chat": "/chat",
            "llm": "/llm/*",
            "system": "/system",
            "stream": format!("ws://localhost:{}/stream", state.config.port),
        }
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<AggregatedSnapshot> {
    Json(state.aggregator.aggregated_status().await)
}

pub async fn models(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.aggregator.list_all_models().await;
    Json(json!(catalog))
}

/// Provider mapping plus a `total` count
pub async fn llm_models(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.aggregator.list_all_models().await;
    let total: usize = catalog.values().map(Vec::len).sum();

    let mut body = Map::new();
    for (provider, models) in catalog {
        body.insert(provider, json!(models));
    }
    body.insert("total".to_string(), json!(total));
    Json(Value::Object(body))
}

/// First provider, in configured priority order, that has any model
pub async fn llm_detect(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.aggregator.list_all_models().await;
    let body = match select_first_available(&catalog, &state.config.detect_priority) {
        Some((provider, models)) => json!({
            "available": true,
            "provider": provider,
            "models": models,
        }),
        None => json!({
            "available": false,
            "provider": null,
            "models": [],
        }),
    };
    Json(body)
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResult>, BridgeError> {
    let Json(request) = payload?;
    let result = state.aggregator.route_chat(&request).await?;
    Ok(Json(result))
}

/// Push a fresh snapshot to every subscriber now
pub async fn broadcast_now(State(state): State<AppState>) -> Json<Value> {
    let delivered = state.broadcaster.broadcast_status().await;
    Json(json!({ "delivered": delivered }))
}

pub async fn system(State(state): State<AppState>) -> Json<SystemMetrics> {
    Json(state.system.metrics().await)
}

pub async fn system_gpu(State(state): State<AppState>) -> Json<GpuMetrics> {
    Json(state.system.gpu().await)
}
