//! The outbound push seam between services and the realtime transport.

use async_trait::async_trait;

use planhub_core::result::AppResult;
use planhub_entity::chat::ChatMessageView;
use planhub_entity::notification::UnreadCounts;

/// Best-effort delivery of live events.
///
/// Implementations address users and task rooms by stable identifiers and
/// must not assume anyone is connected. Callers log failures and carry on.
#[async_trait]
pub trait PushChannel: Send + Sync + 'static {
    /// Emit fresh unread counts to a user's channel.
    async fn push_unread_counts(&self, user_id: i64, counts: UnreadCounts) -> AppResult<()>;

    /// Emit a persisted chat message to a task's chat room.
    async fn push_chat_message(&self, task_id: i64, message: &ChatMessageView) -> AppResult<()>;
}

#[cfg(test)]
pub use recording::{PushEvent, RecordingPush};
