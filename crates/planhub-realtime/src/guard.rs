//! Authorization of room subscriptions.

use async_trait::async_trait;

use planhub_core::result::AppResult;
use planhub_entity::user::UserRole;
use planhub_service::ChatService;

/// Decides whether a connected user may join a task chat room.
#[async_trait]
pub trait SubscriptionGuard: Send + Sync {
    /// Whether `user_id` may receive live messages of `task_id`'s chat.
    async fn may_join_task_chat(&self, user_id: i64, role: UserRole, task_id: i64) -> AppResult<bool>;
}

#[async_trait]
impl SubscriptionGuard for ChatService {
    async fn may_join_task_chat(&self, user_id: i64, role: UserRole, task_id: i64) -> AppResult<bool> {
        self.can_join_room(user_id, role, task_id).await
    }
}
