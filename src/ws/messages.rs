//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for commands; server-generated for events.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-originated envelope stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error envelope.
    #[must_use]
    pub fn error(id: String, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client pushed event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands a client can send over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Follow events addressed to these accounts. `["*"]` follows all.
    Subscribe {
        /// Account IDs, or `"*"`.
        user_ids: Vec<String>,
    },
    /// Stop following these accounts.
    Unsubscribe {
        /// Account IDs, or `"*"`.
        user_ids: Vec<String>,
    },
}

impl WsCommand {
    /// Splits the raw id list into parsed account ids and the wildcard flag.
    /// Entries that are neither `"*"` nor a UUID are dropped.
    #[must_use]
    pub fn targets(raw: &[String]) -> (Vec<crate::domain::UserId>, bool) {
        let mut ids = Vec::new();
        let mut wildcard = false;
        for entry in raw {
            if entry == "*" {
                wildcard = true;
            } else if let Ok(uuid) = entry.parse::<uuid::Uuid>() {
                ids.push(uuid.into());
            }
        }
        (ids, wildcard)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_command_parses_from_payload() {
        let payload = serde_json::json!({ "command": "subscribe", "user_ids": ["*", "junk"] });
        let Ok(WsCommand::Subscribe { user_ids }) = serde_json::from_value::<WsCommand>(payload)
        else {
            panic!("subscribe not parsed");
        };
        let (ids, wildcard) = WsCommand::targets(&user_ids);
        assert!(wildcard);
        assert!(ids.is_empty());
    }

    #[test]
    fn envelope_timestamp_is_optional_for_clients() {
        let raw = r#"{"id":"1","type":"command","payload":{}}"#;
        let Ok(msg) = serde_json::from_str::<WsMessage>(raw) else {
            panic!("envelope not parsed");
        };
        assert_eq!(msg.msg_type, WsMessageType::Command);
    }
}
