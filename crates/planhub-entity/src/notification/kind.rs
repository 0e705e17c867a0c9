//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::NotificationCategory;

/// The closed set of events a notification can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A new message was posted in a task chat.
    NewChatMessage,
    /// The user was mentioned in a task chat.
    MentionInTask,
    /// A task was assigned to the user.
    NewTaskAssigned,
    /// The status of a task changed.
    TaskStatusChanged,
    /// The details of a task changed.
    TaskInfoChanged,
    /// A task was completed.
    TaskCompleted,
    /// A task is approaching its due date.
    TaskDueSoon,
}

impl NotificationKind {
    /// Kinds that are cleared when a user opens a task chat.
    pub const CHAT_KINDS: [NotificationKind; 2] = [Self::NewChatMessage, Self::MentionInTask];

    /// Derive the category for this kind.
    pub fn category(&self) -> NotificationCategory {
        match self {
            Self::NewChatMessage | Self::MentionInTask => NotificationCategory::Chat,
            Self::NewTaskAssigned
            | Self::TaskStatusChanged
            | Self::TaskInfoChanged
            | Self::TaskCompleted
            | Self::TaskDueSoon => NotificationCategory::System,
        }
    }

    /// Return the kind as its stored snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewChatMessage => "new_chat_message",
            Self::MentionInTask => "mention_in_task",
            Self::NewTaskAssigned => "new_task_assigned",
            Self::TaskStatusChanged => "task_status_changed",
            Self::TaskInfoChanged => "task_info_changed",
            Self::TaskCompleted => "task_completed",
            Self::TaskDueSoon => "task_due_soon",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
