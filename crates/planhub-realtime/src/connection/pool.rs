//! Connection pool: tracks all active connections indexed by user ID.

use std::sync::Arc;

use dashmap::DashMap;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// User ID to connection handles (one user can have multiple connections).
    by_user: DashMap<i64, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID to connection handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        // Drop the user entry in the same shard lock that emptied it.
        self.by_user.remove_if_mut(&handle.user_id, |_, connections| {
            connections.retain(|c| c.id != *conn_id);
            connections.is_empty()
        });
        Some(handle)
    }

    /// Gets all connections for a user, oldest first.
    pub fn user_connections(&self, user_id: i64) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every connection.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Total connection count.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}
