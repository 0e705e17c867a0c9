//! Notification read/write operations with unread-count synchronization.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use planhub_core::config::NotificationConfig;
use planhub_core::error::AppError;
use planhub_core::result::AppResult;
use planhub_database::store::NotificationStore;
use planhub_entity::notification::{
    NewNotification, Notification, NotificationCategory, NotificationKind, UnreadCounts,
};
use planhub_entity::task::TaskChatContext;

use crate::context::RequestContext;
use crate::push::PushChannel;

/// A listing of notifications with the unread count of the returned set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    /// The notifications, newest first.
    pub notifications: Vec<Notification>,
    /// How many of the returned notifications are unread.
    pub unread_count: usize,
}

/// Manages user notifications and keeps live unread counts in sync.
///
/// Every operation that changes a user's unread set recomputes both
/// category counts from storage and pushes them to that user's channel.
#[derive(Clone)]
pub struct NotificationService {
    /// Notification persistence.
    store: Arc<dyn NotificationStore>,
    /// Live push transport.
    push: Arc<dyn PushChannel>,
    /// Maximum listing size.
    page_size: u32,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        push: Arc<dyn PushChannel>,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            store,
            push,
            page_size: config.page_size,
        }
    }

    /// Persists a notification and publishes the recipient's new counts.
    pub async fn create(&self, draft: &NewNotification) -> AppResult<Notification> {
        let notification = self.store.create(draft).await?;
        debug!(
            notification_id = notification.id,
            user_id = notification.user_id,
            kind = %notification.kind,
            "Notification created"
        );
        self.publish_unread_counts(notification.user_id).await;
        Ok(notification)
    }

    /// Lists the caller's notifications, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        category: Option<NotificationCategory>,
    ) -> AppResult<NotificationList> {
        let notifications = self
            .store
            .list_for_user(ctx.user_id, unread_only, category, self.page_size)
            .await?;
        let unread_count = notifications.iter().filter(|n| n.is_unread()).count();
        Ok(NotificationList {
            notifications,
            unread_count,
        })
    }

    /// Returns the caller's current unread counts.
    pub async fn unread_counts(&self, ctx: &RequestContext) -> AppResult<UnreadCounts> {
        self.store.unread_counts(ctx.user_id).await
    }

    /// Marks one of the caller's notifications read.
    ///
    /// Already-read notifications are returned unchanged.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        notification_id: i64,
    ) -> AppResult<Notification> {
        if notification_id <= 0 {
            return Err(AppError::validation("Notification id must be positive"));
        }

        let transition = self
            .store
            .mark_read(notification_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {notification_id} not found")))?;

        if transition.changed() {
            self.publish_unread_counts(ctx.user_id).await;
        }
        Ok(transition.into_inner())
    }

    /// Marks all of the caller's unread notifications read, optionally for one category.
    pub async fn mark_all_read(
        &self,
        ctx: &RequestContext,
        category: Option<NotificationCategory>,
    ) -> AppResult<u64> {
        let count = self.store.mark_all_read(ctx.user_id, category).await?;
        info!(user_id = ctx.user_id, ?category, count, "Marked notifications read");
        if count > 0 {
            self.publish_unread_counts(ctx.user_id).await;
        }
        Ok(count)
    }

    /// Marks the caller's unread chat notifications for one task read.
    pub async fn mark_task_chat_read(&self, ctx: &RequestContext, task_id: i64) -> AppResult<u64> {
        if task_id <= 0 {
            return Err(AppError::validation("Task id must be positive"));
        }

        let fragment = TaskChatContext::chat_url_fragment(task_id);
        let count = self
            .store
            .mark_read_by_resource(ctx.user_id, &NotificationKind::CHAT_KINDS, &fragment)
            .await?;
        debug!(user_id = ctx.user_id, task_id, count, "Marked task chat notifications read");
        if count > 0 {
            self.publish_unread_counts(ctx.user_id).await;
        }
        Ok(count)
    }

    /// Recomputes a user's unread counts and pushes them to the user's channel.
    ///
    /// Failures are logged and never propagated.
    pub async fn publish_unread_counts(&self, user_id: i64) {
        let counts = match self.store.unread_counts(user_id).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to count unread notifications");
                return;
            }
        };

        if let Err(e) = self.push.push_unread_counts(user_id, counts).await {
            warn!(user_id, error = %e, "Failed to push unread counts");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planhub_database::memory::MemoryStore;
    use planhub_entity::user::UserRole;

    use crate::push::RecordingPush;

    fn ctx(user_id: i64) -> RequestContext {
        RequestContext::new(user_id, UserRole::User, format!("user{user_id}"), "127.0.0.1".into(), None)
    }

    fn service(store: &MemoryStore, push: Arc<RecordingPush>) -> NotificationService {
        NotificationService::new(Arc::new(store.clone()), push, &NotificationConfig::default())
    }

    fn chat_draft(user_id: i64, task_id: i64) -> NewNotification {
        NewNotification::new(user_id, NotificationKind::NewChatMessage, "hola")
            .with_destination(format!("/projects/1/tasks/{task_id}/chat"))
    }

    #[tokio::test]
    async fn test_create_pushes_fresh_counts() {
        let store = MemoryStore::new();
        let push = Arc::new(RecordingPush::new());
        let svc = service(&store, push.clone());

        svc.create(&chat_draft(3, 42)).await.unwrap();
        svc.create(&NewNotification::new(3, NotificationKind::TaskDueSoon, "due")).await.unwrap();

        let counts = push.last_counts_for(3).await.unwrap();
        assert_eq!(counts, UnreadCounts { system_count: 1, chat_count: 1 });
    }

    #[tokio::test]
    async fn test_push_failure_does_not_fail_create() {
        let store = MemoryStore::new();
        let svc = service(&store, Arc::new(RecordingPush::failing()));
        assert!(svc.create(&chat_draft(3, 42)).await.is_ok());
    }

    #[tokio::test]
    async fn test_unread_listing_is_subset_of_full_listing() {
        let store = MemoryStore::new();
        let push = Arc::new(RecordingPush::new());
        let svc = service(&store, push);
        let first = svc.create(&chat_draft(3, 42)).await.unwrap();
        svc.create(&chat_draft(3, 43)).await.unwrap();
        svc.mark_read(&ctx(3), first.id).await.unwrap();

        let all = svc.list(&ctx(3), false, None).await.unwrap();
        let unread = svc.list(&ctx(3), true, None).await.unwrap();
        assert_eq!(all.notifications.len(), 2);
        assert_eq!(all.unread_count, 1);
        assert_eq!(unread.notifications.len(), 1);
        assert!(unread.notifications.iter().all(|n| !n.is_read));
        assert!(unread.notifications.iter().all(|u| all.notifications.iter().any(|a| a.id == u.id)));
    }

    #[tokio::test]
    async fn test_mark_read_twice_pushes_once() {
        let store = MemoryStore::new();
        let push = Arc::new(RecordingPush::new());
        let svc = service(&store, push.clone());
        let n = svc.create(&chat_draft(3, 42)).await.unwrap();
        let before = push.events().await.len();

        assert!(svc.mark_read(&ctx(3), n.id).await.unwrap().is_read);
        assert!(svc.mark_read(&ctx(3), n.id).await.unwrap().is_read);
        assert_eq!(push.events().await.len(), before + 1);
        assert_eq!(push.last_counts_for(3).await.unwrap().total(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_of_foreign_notification_is_not_found() {
        let store = MemoryStore::new();
        let svc = service(&store, Arc::new(RecordingPush::new()));
        let n = svc.create(&chat_draft(3, 42)).await.unwrap();

        let err = svc.mark_read(&ctx(9), n.id).await.unwrap_err();
        assert_eq!(err.kind, planhub_core::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_mark_all_read_by_category() {
        let store = MemoryStore::new();
        let svc = service(&store, Arc::new(RecordingPush::new()));
        svc.create(&chat_draft(3, 42)).await.unwrap();
        svc.create(&NewNotification::new(3, NotificationKind::NewTaskAssigned, "assigned"))
            .await
            .unwrap();

        let n = svc.mark_all_read(&ctx(3), Some(NotificationCategory::System)).await.unwrap();
        assert_eq!(n, 1);
        let counts = svc.unread_counts(&ctx(3)).await.unwrap();
        assert_eq!(counts, UnreadCounts { system_count: 0, chat_count: 1 });
        assert_eq!(svc.mark_all_read(&ctx(3), None).await.unwrap(), 1);
        assert_eq!(svc.mark_all_read(&ctx(3), None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_task_chat_read_then_zero() {
        let store = MemoryStore::new();
        let push = Arc::new(RecordingPush::new());
        let svc = service(&store, push.clone());
        svc.create(&chat_draft(9, 42)).await.unwrap();

        assert_eq!(svc.mark_task_chat_read(&ctx(9), 42).await.unwrap(), 1);
        assert_eq!(svc.mark_task_chat_read(&ctx(9), 42).await.unwrap(), 0);
        assert_eq!(push.last_counts_for(9).await.unwrap().chat_count, 0);
    }

    #[tokio::test]
    async fn test_mark_task_chat_read_rejects_bad_id() {
        let store = MemoryStore::new();
        let svc = service(&store, Arc::new(RecordingPush::new()));
        let err = svc.mark_task_chat_read(&ctx(9), 0).await.unwrap_err();
        assert_eq!(err.kind, planhub_core::ErrorKind::Validation);
    }
}
