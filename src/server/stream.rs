//! `/stream` WebSocket endpoint
//!
//! Each connection becomes one broadcaster subscription. The client may pull
//! a snapshot at any time by sending `status` or `{"type":"status"}`.

use super::state::AppState;
use crate::broadcaster::Subscription;
use crate::logging::{log_debug, log_info};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;

pub async fn stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut subscription: Subscription = state.broadcaster.subscribe().await;
    let id = subscription.id();
    let (mut sink, mut source) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = subscription.recv().await {
            if sink.send(Message::Text(message.to_string())).await.is_err() {
                break;
            }
        }
        // Dropping the subscription here unregisters it.
    });

    let broadcaster = state.broadcaster.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = source.next().await {
            match message {
                Message::Text(text) if is_status_pull(&text) => {
                    broadcaster.send_status_to(id).await;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    log_info!(subscriber = %id, "Stream client disconnected");
}

/// `status` as plain text or `{"type":"status"}`
pub fn is_status_pull(text: &str) -> bool {
    let text = text.trim();
    if text.eq_ignore_ascii_case("status") {
        return true;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => value.get("type").and_then(Value::as_str) == Some("status"),
        Err(_) => {
            log_debug!(message = %text, "Ignoring unrecognized stream message");
            false
        }
    }
}
