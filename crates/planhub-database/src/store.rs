//! Storage traits consumed by the service layer.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`]
//! and, with the `memory` feature, an in-memory one in `crate::memory`.

use async_trait::async_trait;

use planhub_core::result::AppResult;
use planhub_core::types::{PageRequest, PageResponse};
use planhub_entity::chat::ChatMessageView;
use planhub_entity::notification::{
    NewNotification, Notification, NotificationCategory, NotificationKind, ReadTransition,
    UnreadCounts,
};
use planhub_entity::task::{Task, TaskChatContext};
use planhub_entity::user::UserSummary;

/// Persistence of notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Insert one notification; the category is derived from the draft's kind.
    async fn create(&self, draft: &NewNotification) -> AppResult<Notification>;

    /// List a user's notifications, newest first.
    async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        category: Option<NotificationCategory>,
        limit: u32,
    ) -> AppResult<Vec<Notification>>;

    /// Mark one notification read. `None` when it does not exist or is not owned by `user_id`.
    async fn mark_read(&self, notification_id: i64, user_id: i64)
    -> AppResult<Option<ReadTransition>>;

    /// Mark every unread notification read, optionally limited to one category.
    async fn mark_all_read(
        &self,
        user_id: i64,
        category: Option<NotificationCategory>,
    ) -> AppResult<u64>;

    /// Mark unread notifications of the given kinds whose destination URL contains `url_fragment`.
    async fn mark_read_by_resource(
        &self,
        user_id: i64,
        kinds: &[NotificationKind],
        url_fragment: &str,
    ) -> AppResult<u64>;

    /// Count unread notifications per category in a single snapshot.
    async fn unread_counts(&self, user_id: i64) -> AppResult<UnreadCounts>;
}

/// Persistence of task chat messages.
#[async_trait]
pub trait ChatStore: Send + Sync + 'static {
    /// Insert a message and return it joined with its sender.
    async fn create(&self, task_id: i64, sender_id: i64, content: &str)
    -> AppResult<ChatMessageView>;

    /// List a task's messages, newest first.
    async fn list_for_task(
        &self,
        task_id: i64,
        page: PageRequest,
    ) -> AppResult<PageResponse<ChatMessageView>>;
}

/// Read access to tasks and their relationships.
#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    /// Load a task with its project and role-tagged participants.
    async fn find_chat_context(&self, task_id: i64) -> AppResult<Option<TaskChatContext>>;

    /// Set the assignee of a task.
    async fn update_assignee(&self, task_id: i64, assignee_id: i64) -> AppResult<Task>;
}

/// Read access to user identities.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Load a user's public identity.
    async fn find_summary(&self, user_id: i64) -> AppResult<Option<UserSummary>>;
}
