//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::warn;
use uuid::Uuid;

use planhub_entity::user::UserRole;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender for pushing serialized frames to the client, plus
/// metadata about the connected user.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: i64,
    /// User's role (cached for subscription checks).
    pub role: UserRole,
    /// Username (cached for logging).
    pub username: String,
    /// Sender for outbound frames.
    sender: mpsc::Sender<String>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last inbound activity.
    last_activity: RwLock<DateTime<Utc>>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(user_id: i64, role: UserRole, username: String, sender: mpsc::Sender<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            role,
            username,
            sender,
            connected_at: now,
            last_activity: RwLock::new(now),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a frame for this connection. Never blocks.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Connection send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.close();
                false
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as closed.
    pub fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Update last activity timestamp.
    pub async fn touch(&self) {
        *self.last_activity.write().await = Utc::now();
    }

    /// Last inbound activity.
    pub async fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.read().await
    }
}
