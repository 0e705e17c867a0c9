//! Task chat entities.

pub mod model;

pub use model::{ChatMessage, ChatMessageView, MAX_CHAT_CONTENT_CHARS};
