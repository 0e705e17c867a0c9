//! Channel type definitions and parsing.

use serde::{Deserialize, Serialize};

/// Typed channel identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum ChannelType {
    /// Personal user channel: unread counts.
    User(i64),
    /// Task chat room: new chat messages.
    TaskChat(i64),
}

impl ChannelType {
    /// Parses a channel string into a typed channel.
    pub fn parse(channel: &str) -> Option<Self> {
        let parts: Vec<&str> = channel.split(':').collect();
        match parts.as_slice() {
            ["user", id] => parse_id(id).map(ChannelType::User),
            ["task", id, "chat"] => parse_id(id).map(ChannelType::TaskChat),
            _ => None,
        }
    }

    /// Converts back to a channel string.
    pub fn to_channel_string(&self) -> String {
        match self {
            ChannelType::User(id) => format!("user:{id}"),
            ChannelType::TaskChat(id) => format!("task:{id}:chat"),
        }
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_channel_string())
    }
}
