//! Connection manager: handles connection lifecycle and message routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use planhub_core::config::RealtimeConfig;
use planhub_entity::user::UserRole;

use crate::channel::registry::ChannelRegistry;
use crate::channel::types::ChannelType;
use crate::guard::SubscriptionGuard;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::message::validator::{validate_channel_name, validate_inbound};

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Channel registry.
    channels: Arc<ChannelRegistry>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig, channels: Arc<ChannelRegistry>) -> Self {
        Self {
            pool: ConnectionPool::new(),
            channels,
            config,
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// The connection is auto-subscribed to its user channel. Returns the
    /// handle and the receiver of serialized outbound frames.
    pub fn register(
        &self,
        user_id: i64,
        role: UserRole,
        username: String,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(user_id, role, username, tx));

        let existing = self.pool.user_connections(user_id);
        if existing.len() >= self.config.max_connections_per_user {
            warn!(
                user_id,
                count = existing.len(),
                max = self.config.max_connections_per_user,
                "User at max connections, closing oldest"
            );
            if let Some(oldest) = existing.first() {
                send_frame(oldest, &OutboundMessage::error("CONNECTION_REPLACED", "Too many connections"));
                self.unregister(&oldest.id);
            }
        }

        self.pool.add(handle.clone());
        self.channels
            .subscribe(&ChannelType::User(user_id).to_channel_string(), handle.id);

        info!(conn_id = %handle.id, user_id, "WebSocket connection registered");
        (handle, rx)
    }

    /// Unregisters a connection and cleans up subscriptions.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.close();
            self.channels.unsubscribe_all(*conn_id);
            info!(conn_id = %conn_id, user_id = handle.user_id, "WebSocket connection unregistered");
        }
    }

    /// Processes an inbound frame from a client.
    pub async fn handle_inbound(
        &self,
        conn_id: &ConnectionId,
        raw_message: &str,
        guard: &dyn SubscriptionGuard,
    ) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        handle.touch().await;

        if let Err(e) = validate_inbound(raw_message) {
            send_frame(&handle, &OutboundMessage::error("INVALID_MESSAGE", e.message));
            return;
        }

        let msg: InboundMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                send_frame(
                    &handle,
                    &OutboundMessage::error("INVALID_MESSAGE", format!("Failed to parse message: {e}")),
                );
                return;
            }
        };

        match msg {
            InboundMessage::Subscribe { channel } => {
                self.handle_subscribe(&handle, &channel, guard).await;
            }
            InboundMessage::Unsubscribe { channel } => {
                self.channels.unsubscribe(&channel, handle.id);
                send_frame(&handle, &OutboundMessage::Unsubscribed { channel });
                debug!(conn_id = %conn_id, "Unsubscribed from channel");
            }
            InboundMessage::Pong { .. } => {}
        }
    }

    /// Handles a subscribe request with permission checking.
    async fn handle_subscribe(
        &self,
        handle: &ConnectionHandle,
        channel: &str,
        guard: &dyn SubscriptionGuard,
    ) {
        if let Err(e) = validate_channel_name(channel) {
            send_frame(handle, &OutboundMessage::error("INVALID_CHANNEL", e.message));
            return;
        }

        let Some(channel_type) = ChannelType::parse(channel) else {
            send_frame(
                handle,
                &OutboundMessage::error("INVALID_CHANNEL", format!("Unknown channel: {channel}")),
            );
            return;
        };

        if self.channels.subscription_count(handle.id) >= self.config.max_subscriptions_per_connection {
            send_frame(
                handle,
                &OutboundMessage::error(
                    "MAX_SUBSCRIPTIONS",
                    format!(
                        "Maximum subscriptions ({}) reached",
                        self.config.max_subscriptions_per_connection
                    ),
                ),
            );
            return;
        }

        let allowed = match channel_type {
            ChannelType::User(user_id) => user_id == handle.user_id,
            ChannelType::TaskChat(task_id) => {
                match guard.may_join_task_chat(handle.user_id, handle.role, task_id).await {
                    Ok(allowed) => allowed,
                    Err(e) => {
                        error!(conn_id = %handle.id, task_id, error = %e, "Room authorization failed");
                        send_frame(handle, &OutboundMessage::error("INTERNAL", "Could not authorize subscription"));
                        return;
                    }
                }
            }
        };

        if !allowed {
            send_frame(
                handle,
                &OutboundMessage::error("FORBIDDEN", format!("Not authorized to subscribe to channel: {channel}")),
            );
            return;
        }

        self.channels.subscribe(channel, handle.id);
        if self.pool.get(&handle.id).is_none() {
            // Unregistered while the guard was pending.
            self.channels.unsubscribe_all(handle.id);
            debug!(conn_id = %handle.id, channel = %channel, "Dropped subscription for closed connection");
            return;
        }
        send_frame(
            handle,
            &OutboundMessage::Subscribed {
                channel: channel.to_string(),
            },
        );
        debug!(conn_id = %handle.id, channel = %channel, "Subscribed to channel");
    }

    /// Sends a message to every connection of a user. Returns the number of frames queued.
    pub fn send_to_user(&self, user_id: i64, message: &OutboundMessage) -> usize {
        self.send_to_channel(&ChannelType::User(user_id).to_channel_string(), message)
    }

    /// Sends a message to every subscriber of a channel. Returns the number of frames queued.
    pub fn send_to_channel(&self, channel: &str, message: &OutboundMessage) -> usize {
        let subscriber_ids = self.channels.subscribers(channel);
        if subscriber_ids.is_empty() {
            return 0;
        }

        let frame = match serde_json::to_string(message) {
            Ok(f) => f,
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound message");
                return 0;
            }
        };

        subscriber_ids
            .iter()
            .filter_map(|conn_id| self.pool.get(conn_id))
            .filter(|handle| handle.send(frame.clone()))
            .count()
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            self.unregister(&conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Returns the realtime configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}

fn send_frame(handle: &ConnectionHandle, message: &OutboundMessage) {
    match serde_json::to_string(message) {
        Ok(frame) => {
            handle.send(frame);
        }
        Err(e) => error!(error = %e, "Failed to serialize outbound message"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use planhub_core::result::AppResult;

    struct AllowTask(i64);

    #[async_trait]
    impl SubscriptionGuard for AllowTask {
        async fn may_join_task_chat(&self, _user_id: i64, _role: UserRole, task_id: i64) -> AppResult<bool> {
            Ok(task_id == self.0)
        }
    }

    fn manager(max_per_user: usize) -> ConnectionManager {
        let config = RealtimeConfig {
            max_connections_per_user: max_per_user,
            ..RealtimeConfig::default()
        };
        ConnectionManager::new(config, Arc::new(ChannelRegistry::new()))
    }

    fn frame_type(frame: &str) -> String {
        let value: serde_json::Value = serde_json::from_str(frame).unwrap();
        value["type"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_auto_subscribes_user_channel() {
        let manager = manager(5);
        let (_handle, mut rx) = manager.register(7, UserRole::User, "diego".into());

        let sent = manager.send_to_user(
            7,
            &OutboundMessage::UnreadCountUpdated {
                system_count: 0,
                chat_count: 1,
            },
        );
        assert_eq!(sent, 1);
        assert_eq!(frame_type(&rx.recv().await.unwrap()), "unread_count_updated");
        assert_eq!(manager.send_to_user(8, &OutboundMessage::Ping { timestamp: 0 }), 0);
    }

    #[tokio::test]
    async fn test_room_subscription_is_guarded() {
        let manager = manager(5);
        let (handle, mut rx) = manager.register(7, UserRole::User, "diego".into());
        let guard = AllowTask(42);

        manager
            .handle_inbound(&handle.id, r#"{"type":"subscribe","channel":"task:42:chat"}"#, &guard)
            .await;
        assert_eq!(frame_type(&rx.recv().await.unwrap()), "subscribed");

        manager
            .handle_inbound(&handle.id, r#"{"type":"subscribe","channel":"task:43:chat"}"#, &guard)
            .await;
        assert_eq!(frame_type(&rx.recv().await.unwrap()), "error");

        assert_eq!(manager.send_to_channel("task:42:chat", &OutboundMessage::Ping { timestamp: 1 }), 1);
        assert_eq!(manager.send_to_channel("task:43:chat", &OutboundMessage::Ping { timestamp: 1 }), 0);
    }

    #[tokio::test]
    async fn test_cannot_subscribe_to_other_user_channel() {
        let manager = manager(5);
        let (handle, mut rx) = manager.register(7, UserRole::Admin, "root".into());
        manager
            .handle_inbound(&handle.id, r#"{"type":"subscribe","channel":"user:9"}"#, &AllowTask(0))
            .await;
        assert_eq!(frame_type(&rx.recv().await.unwrap()), "error");
    }

    #[tokio::test]
    async fn test_connection_cap_replaces_oldest() {
        let manager = manager(1);
        let (first, _rx1) = manager.register(7, UserRole::User, "diego".into());
        let (second, _rx2) = manager.register(7, UserRole::User, "diego".into());

        assert!(!first.is_alive());
        assert!(second.is_alive());
        assert_eq!(manager.connection_count(), 1);
        assert_eq!(manager.user_count(), 1);
    }

    struct UnregisterDuringCheck {
        manager: Arc<ConnectionManager>,
        conn_id: ConnectionId,
    }

    #[async_trait]
    impl SubscriptionGuard for UnregisterDuringCheck {
        async fn may_join_task_chat(&self, _user_id: i64, _role: UserRole, _task_id: i64) -> AppResult<bool> {
            self.manager.unregister(&self.conn_id);
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_subscribe_after_unregister_leaves_no_membership() {
        let manager = Arc::new(manager(5));
        let (handle, _rx) = manager.register(7, UserRole::User, "diego".into());
        let guard = UnregisterDuringCheck {
            manager: Arc::clone(&manager),
            conn_id: handle.id,
        };

        manager
            .handle_inbound(&handle.id, r#"{"type":"subscribe","channel":"task:42:chat"}"#, &guard)
            .await;

        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.channels.subscription_count(handle.id), 0);
        assert!(manager.channels.subscribers("task:42:chat").is_empty());
        assert_eq!(manager.channels.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_unregister_cleans_subscriptions() {
        let manager = manager(5);
        let (handle, _rx) = manager.register(7, UserRole::User, "diego".into());
        manager.unregister(&handle.id);
        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.send_to_user(7, &OutboundMessage::Ping { timestamp: 0 }), 0);
    }
}
