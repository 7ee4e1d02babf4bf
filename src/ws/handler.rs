//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws` — Upgrades to the live notification feed.
///
/// The bus receiver is taken before the upgrade completes, so events
/// published during the handshake are not lost.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let event_rx = state.event_bus.subscribe();
    tracing::debug!(
        subscribers = state.event_bus.receiver_count(),
        "ws upgrade requested"
    );
    ws.on_upgrade(move |socket| run_connection(socket, event_rx))
}
