//! [`PushChannel`] implementation over the WebSocket connection manager.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use planhub_core::result::AppResult;
use planhub_entity::chat::ChatMessageView;
use planhub_entity::notification::UnreadCounts;
use planhub_service::PushChannel;

use crate::channel::types::ChannelType;
use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundMessage;

/// Fire-and-forget delivery to connected clients.
///
/// Users with no live connection simply receive nothing.
#[derive(Debug, Clone)]
pub struct RealtimePublisher {
    connections: Arc<ConnectionManager>,
}

impl RealtimePublisher {
    /// Creates a publisher over the given connection manager.
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }
}

#[async_trait]
impl PushChannel for RealtimePublisher {
    async fn push_unread_counts(&self, user_id: i64, counts: UnreadCounts) -> AppResult<()> {
        let delivered = self.connections.send_to_user(
            user_id,
            &OutboundMessage::UnreadCountUpdated {
                system_count: counts.system_count,
                chat_count: counts.chat_count,
            },
        );
        debug!(user_id, delivered, "Pushed unread counts");
        Ok(())
    }

    async fn push_chat_message(&self, task_id: i64, message: &ChatMessageView) -> AppResult<()> {
        let room = ChannelType::TaskChat(task_id).to_channel_string();
        let delivered = self.connections.send_to_channel(
            &room,
            &OutboundMessage::NewChatMessage {
                message: message.clone(),
            },
        );
        debug!(task_id, message_id = message.id, delivered, "Broadcast chat message");
        Ok(())
    }
}
