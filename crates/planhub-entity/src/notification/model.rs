//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::category::NotificationCategory;
use super::kind::NotificationKind;

/// A notification delivered to a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: i64,
    /// The recipient user.
    pub user_id: i64,
    /// Event kind.
    pub kind: NotificationKind,
    /// Category derived from `kind` at creation.
    pub category: NotificationCategory,
    /// Human-readable text.
    pub message: String,
    /// Client route the notification links to.
    pub destination_url: Option<String>,
    /// Identifier of the referenced resource.
    pub resource_id: Option<i64>,
    /// Kind of the referenced resource (`"chat_message"`, `"task"`).
    pub resource_kind: Option<String>,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification is still unread.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}

/// A notification that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// The recipient user.
    pub user_id: i64,
    /// Event kind; the category is derived from it.
    pub kind: NotificationKind,
    /// Human-readable text.
    pub message: String,
    /// Client route the notification links to.
    pub destination_url: Option<String>,
    /// Identifier of the referenced resource.
    pub resource_id: Option<i64>,
    /// Kind of the referenced resource.
    pub resource_kind: Option<String>,
}

impl NewNotification {
    /// Create a draft with no destination or resource reference.
    pub fn new(user_id: i64, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            user_id,
            kind,
            message: message.into(),
            destination_url: None,
            resource_id: None,
            resource_kind: None,
        }
    }

    /// Attach the client route.
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.destination_url = Some(url.into());
        self
    }

    /// Attach a resource reference.
    pub fn with_resource(mut self, id: i64, kind: impl Into<String>) -> Self {
        self.resource_id = Some(id);
        self.resource_kind = Some(kind.into());
        self
    }

    /// The category this notification will be stored under.
    pub fn category(&self) -> NotificationCategory {
        self.kind.category()
    }
}

/// Outcome of marking a single notification read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadTransition {
    /// The notification went from unread to read.
    Transitioned(Notification),
    /// The notification was already read; returned unchanged.
    AlreadyRead(Notification),
}

impl ReadTransition {
    /// Whether the unread set changed.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Transitioned(_))
    }

    /// Unwrap the notification.
    pub fn into_inner(self) -> Notification {
        match self {
            Self::Transitioned(n) | Self::AlreadyRead(n) => n,
        }
    }
}
