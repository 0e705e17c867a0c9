//! Chat message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::user::UserSummary;

/// Maximum length of a chat message body, in characters.
pub const MAX_CHAT_CONTENT_CHARS: usize = 2000;

/// A persisted chat message. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: i64,
    /// The task this message belongs to.
    pub task_id: i64,
    /// The user who sent the message.
    pub sender_id: i64,
    /// HTML-bearing message body.
    pub content: String,
    /// When the message was sent.
    pub created_at: DateTime<Utc>,
}

/// A chat message joined with its sender's public identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageView {
    /// Unique message identifier.
    pub id: i64,
    /// The task this message belongs to.
    pub task_id: i64,
    /// HTML-bearing message body.
    pub content: String,
    /// When the message was sent.
    pub created_at: DateTime<Utc>,
    /// The sender.
    pub sender: UserSummary,
}

impl ChatMessageView {
    /// Combine a stored message with its sender.
    pub fn new(message: ChatMessage, sender: UserSummary) -> Self {
        Self {
            id: message.id,
            task_id: message.task_id,
            content: message.content,
            created_at: message.created_at,
            sender,
        }
    }
}
