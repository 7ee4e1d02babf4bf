//! WebSocket connection loop.
//!
//! Reads subscribe/unsubscribe commands from the client and forwards the
//! events whose audience it follows.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::MarketEvent;

/// Runs the read/write loop for a single WebSocket connection.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<MarketEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();
    tracing::debug!("ws connection opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs);
                        if let Some(json) = reply
                            && ws_tx.send(Message::text(json)).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if !subs.matches(&event) {
                            continue;
                        }
                        let Ok(payload) = serde_json::to_value(&event) else {
                            continue;
                        };
                        let envelope = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            payload,
                        );
                        let Ok(json) = serde_json::to_string(&envelope) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text frame, returning the JSON reply to send back.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error(String::new(), 400, "malformed JSON")).ok();
    };
    if msg.msg_type != WsMessageType::Command {
        return serde_json::to_string(&WsMessage::error(msg.id, 400, "expected a command")).ok();
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let payload = match command {
        WsCommand::Subscribe { user_ids } => {
            let (ids, wildcard) = WsCommand::targets(&user_ids);
            subs.subscribe(&ids, wildcard);
            serde_json::json!({
                "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::Unsubscribe { user_ids } => {
            let (ids, wildcard) = WsCommand::targets(&user_ids);
            subs.unsubscribe(&ids, wildcard);
            serde_json::json!({
                "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "remaining_count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
    };
    serde_json::to_string(&WsMessage::new(msg.id, WsMessageType::Response, payload)).ok()
}
