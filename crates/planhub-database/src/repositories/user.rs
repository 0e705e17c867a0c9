//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use planhub_core::error::{AppError, ErrorKind};
use planhub_core::result::AppResult;
use planhub_entity::user::UserSummary;

use crate::store::UserStore;

/// Repository for user identities.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_summary(&self, user_id: i64) -> AppResult<Option<UserSummary>> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, display_name, email, role FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }
}
