//! Notification repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use planhub_core::error::{AppError, ErrorKind};
use planhub_core::result::AppResult;
use planhub_entity::notification::{
    NewNotification, Notification, NotificationCategory, NotificationKind, ReadTransition,
    UnreadCounts,
};

use crate::store::NotificationStore;

/// Repository for notification records.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_owned(&self, notification_id: i64, user_id: i64) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find notification", e))
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, draft: &NewNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, kind, category, message, destination_url, resource_id, resource_kind) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(draft.user_id)
        .bind(draft.kind)
        .bind(draft.category())
        .bind(&draft.message)
        .bind(draft.destination_url.as_deref())
        .bind(draft.resource_id)
        .bind(draft.resource_kind.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        category: Option<NotificationCategory>,
        limit: u32,
    ) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications \
             WHERE user_id = $1 \
               AND ($2 = FALSE OR is_read = FALSE) \
               AND ($3::notification_category IS NULL OR category = $3) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4",
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(category)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))
    }

    async fn mark_read(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> AppResult<Option<ReadTransition>> {
        let updated = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND is_read = FALSE RETURNING *",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark notification read", e))?;

        if let Some(notification) = updated {
            return Ok(Some(ReadTransition::Transitioned(notification)));
        }

        debug!(notification_id, user_id, "Notification already read or not owned");
        Ok(self
            .find_owned(notification_id, user_id)
            .await?
            .map(ReadTransition::AlreadyRead))
    }

    async fn mark_all_read(
        &self,
        user_id: i64,
        category: Option<NotificationCategory>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() \
             WHERE user_id = $1 AND is_read = FALSE \
               AND ($2::notification_category IS NULL OR category = $2)",
        )
        .bind(user_id)
        .bind(category)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    async fn mark_read_by_resource(
        &self,
        user_id: i64,
        kinds: &[NotificationKind],
        url_fragment: &str,
    ) -> AppResult<u64> {
        let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() \
             WHERE user_id = $1 AND is_read = FALSE \
               AND kind::text = ANY($2) \
               AND strpos(destination_url, $3) > 0",
        )
        .bind(user_id)
        .bind(kinds)
        .bind(url_fragment)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark notifications read by resource", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn unread_counts(&self, user_id: i64) -> AppResult<UnreadCounts> {
        let (system_count, chat_count): (i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*) FILTER (WHERE category = 'system'), \
                COUNT(*) FILTER (WHERE category = 'chat') \
             FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread notifications", e))?;

        Ok(UnreadCounts {
            system_count,
            chat_count,
        })
    }
}
