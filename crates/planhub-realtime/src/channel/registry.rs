//! Channel registry: owns every user channel and task chat room membership.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Registry of all active pub/sub channels.
///
/// Kept as two indexes: channel name to members, and connection to the
/// channels it joined. Channels exist only while they have members.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    members: DashMap<String, HashSet<ConnectionId>>,
    joined: DashMap<ConnectionId, HashSet<String>>,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a channel. Subscribing twice is a no-op.
    pub fn subscribe(&self, channel_name: &str, conn_id: ConnectionId) {
        self.members
            .entry(channel_name.to_string())
            .or_default()
            .insert(conn_id);
        self.joined
            .entry(conn_id)
            .or_default()
            .insert(channel_name.to_string());
    }

    /// Unsubscribes a connection from a channel.
    pub fn unsubscribe(&self, channel_name: &str, conn_id: ConnectionId) {
        self.leave(channel_name, conn_id);
        if let Some(mut channels) = self.joined.get_mut(&conn_id) {
            channels.remove(channel_name);
        }
    }

    /// Unsubscribes a connection from all channels.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        let Some((_, channels)) = self.joined.remove(&conn_id) else {
            return;
        };
        for channel_name in channels {
            self.leave(&channel_name, conn_id);
        }
    }

    fn leave(&self, channel_name: &str, conn_id: ConnectionId) {
        // Drop the channel in the same shard lock that emptied it.
        self.members.remove_if_mut(channel_name, |_, ids| {
            ids.remove(&conn_id);
            ids.is_empty()
        });
    }

    /// Returns all subscriber connection IDs for a channel.
    pub fn subscribers(&self, channel_name: &str) -> Vec<ConnectionId> {
        self.members
            .get(channel_name)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the subscription count for a connection.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.joined.get(&conn_id).map(|c| c.len()).unwrap_or(0)
    }

    /// Returns total number of active channels.
    pub fn channel_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_empty_channels_are_dropped() {
        let registry = ChannelRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.subscribe("task:42:chat", a);
        registry.subscribe("task:42:chat", b);
        registry.subscribe("user:7", a);
        assert_eq!(registry.channel_count(), 2);
        assert_eq!(registry.subscription_count(a), 2);

        registry.unsubscribe_all(a);
        assert_eq!(registry.subscribers("task:42:chat"), vec![b]);
        assert_eq!(registry.channel_count(), 1);

        registry.unsubscribe("task:42:chat", b);
        assert_eq!(registry.channel_count(), 0);
    }
}
