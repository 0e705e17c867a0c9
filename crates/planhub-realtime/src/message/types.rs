//! Inbound and outbound WebSocket message type definitions.

use serde::{Deserialize, Serialize};

use planhub_entity::chat::ChatMessageView;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Subscribe to a channel.
    Subscribe {
        /// Channel name.
        channel: String,
    },
    /// Unsubscribe from a channel.
    Unsubscribe {
        /// Channel name.
        channel: String,
    },
    /// Pong response to server ping.
    Pong {
        /// Echoed timestamp.
        #[serde(default)]
        timestamp: Option<i64>,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Subscription confirmed.
    Subscribed {
        /// Channel name.
        channel: String,
    },
    /// Unsubscription confirmed.
    Unsubscribed {
        /// Channel name.
        channel: String,
    },
    /// Fresh unread counts for the receiving user.
    #[serde(rename_all = "camelCase")]
    UnreadCountUpdated {
        /// Unread SYSTEM notifications.
        system_count: i64,
        /// Unread CHAT notifications.
        chat_count: i64,
    },
    /// A message posted to a task chat room.
    NewChatMessage {
        /// The persisted message with its sender.
        message: ChatMessageView,
    },
    /// Ping (server keepalive).
    Ping {
        /// Server timestamp.
        timestamp: i64,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl OutboundMessage {
    /// Build an error frame.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_count_wire_shape() {
        let json = serde_json::to_value(OutboundMessage::UnreadCountUpdated {
            system_count: 2,
            chat_count: 5,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "unread_count_updated", "systemCount": 2, "chatCount": 5})
        );
    }

    #[test]
    fn test_parse_subscribe_and_bare_pong() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"subscribe","channel":"task:42:chat"}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Subscribe {
                channel: "task:42:chat".into()
            }
        );

        let pong: InboundMessage = serde_json::from_str(r#"{"type":"pong"}"#).unwrap();
        assert_eq!(pong, InboundMessage::Pong { timestamp: None });
    }
}
