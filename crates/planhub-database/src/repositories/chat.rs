//! Chat message repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use planhub_core::error::{AppError, ErrorKind};
use planhub_core::result::AppResult;
use planhub_core::types::{PageRequest, PageResponse};
use planhub_entity::chat::ChatMessageView;
use planhub_entity::user::{UserRole, UserSummary};

use crate::store::ChatStore;

const VIEW_COLUMNS: &str = "m.id, m.task_id, m.content, m.created_at, \
     u.id AS sender_id, u.display_name, u.email, u.role";

/// A chat message row joined with its sender.
#[derive(Debug, FromRow)]
struct ChatMessageRow {
    id: i64,
    task_id: i64,
    content: String,
    created_at: DateTime<Utc>,
    sender_id: i64,
    display_name: String,
    email: String,
    role: UserRole,
}

impl From<ChatMessageRow> for ChatMessageView {
    fn from(row: ChatMessageRow) -> Self {
        Self {
            id: row.id,
            task_id: row.task_id,
            content: row.content,
            created_at: row.created_at,
            sender: UserSummary {
                id: row.sender_id,
                display_name: row.display_name,
                email: row.email,
                role: row.role,
            },
        }
    }
}

/// Repository for task chat messages.
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Create a new chat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStore for ChatRepository {
    async fn create(
        &self,
        task_id: i64,
        sender_id: i64,
        content: &str,
    ) -> AppResult<ChatMessageView> {
        let sql = format!(
            "WITH m AS ( \
                INSERT INTO chat_messages (task_id, sender_id, content) VALUES ($1, $2, $3) RETURNING * \
             ) \
             SELECT {VIEW_COLUMNS} FROM m JOIN users u ON u.id = m.sender_id"
        );
        sqlx::query_as::<_, ChatMessageRow>(&sql)
            .bind(task_id)
            .bind(sender_id)
            .bind(content)
            .fetch_one(&self.pool)
            .await
            .map(ChatMessageView::from)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create chat message", e))
    }

    async fn list_for_task(
        &self,
        task_id: i64,
        page: PageRequest,
    ) -> AppResult<PageResponse<ChatMessageView>> {
        let offset = i64::try_from(page.offset())
            .map_err(|_| AppError::validation("page is out of range"))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count chat messages", e))?;

        let sql = format!(
            "SELECT {VIEW_COLUMNS} FROM chat_messages m JOIN users u ON u.id = m.sender_id \
             WHERE m.task_id = $1 \
             ORDER BY m.created_at DESC, m.id DESC \
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, ChatMessageRow>(&sql)
            .bind(task_id)
            .bind(page.limit() as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list chat messages", e))?;

        Ok(PageResponse::new(
            rows.into_iter().map(ChatMessageView::from).collect(),
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
