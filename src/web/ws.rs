//! Live-update websocket stub.
//!
//! Real event streaming is out of scope; subscribers get a welcome frame
//! followed by periodic heartbeats carrying the tracked-device count.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde_json::json;
use std::time::Duration;

use super::AppState;

/// GET /ws/updates - heartbeat stream upgrade.
pub async fn handle_ws_updates(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_updates(socket, state))
}

async fn stream_updates(mut socket: WebSocket, state: AppState) {
    tracing::debug!("heartbeat subscriber connected");

    let welcome = json!({"type": "welcome", "message": "monotaur event stream"});
    if socket
        .send(Message::Text(welcome.to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    let period = Duration::from_secs(state.config.heartbeat_interval_s);
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // the first tick completes immediately

    loop {
        interval.tick().await;
        let heartbeat = json!({
            "type": "heartbeat",
            "active_devices": state.store.device_count(),
        });
        if socket
            .send(Message::Text(heartbeat.to_string().into()))
            .await
            .is_err()
        {
            tracing::debug!("heartbeat subscriber disconnected");
            return;
        }
    }
}
