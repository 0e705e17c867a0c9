//! Task chat service.

use std::sync::Arc;

use tracing::{info, warn};

use planhub_auth::access::can_access_task_chat;
use planhub_core::error::AppError;
use planhub_core::result::AppResult;
use planhub_core::types::{PageRequest, PageResponse};
use planhub_database::store::{ChatStore, TaskStore};
use planhub_entity::chat::{ChatMessageView, MAX_CHAT_CONTENT_CHARS};
use planhub_entity::task::TaskChatContext;
use planhub_entity::user::UserRole;

use crate::context::RequestContext;
use crate::fanout::FanoutEngine;
use crate::push::PushChannel;

/// Creates and lists task chat messages.
///
/// Ordering within one send: persist, then fan-out dispatch, then room
/// broadcast. Only the access check and the insert can fail the caller.
#[derive(Clone)]
pub struct ChatService {
    tasks: Arc<dyn TaskStore>,
    chats: Arc<dyn ChatStore>,
    fanout: FanoutEngine,
    push: Arc<dyn PushChannel>,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService").finish_non_exhaustive()
    }
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        chats: Arc<dyn ChatStore>,
        fanout: FanoutEngine,
        push: Arc<dyn PushChannel>,
    ) -> Self {
        Self {
            tasks,
            chats,
            fanout,
            push,
        }
    }

    /// Posts a message to a task chat.
    pub async fn create_message(
        &self,
        ctx: &RequestContext,
        task_id: i64,
        content: &str,
    ) -> AppResult<ChatMessageView> {
        validate_content(content)?;
        let chat_ctx = self.authorize(ctx.user_id, ctx.role, task_id).await?;

        let message = self.chats.create(task_id, ctx.user_id, content).await?;
        info!(
            task_id,
            message_id = message.id,
            sender_id = ctx.user_id,
            "Chat message created"
        );

        self.fanout.notify_task_chat_message(&chat_ctx, &message);

        if let Err(e) = self.push.push_chat_message(task_id, &message).await {
            warn!(task_id, message_id = message.id, error = %e, "Failed to broadcast chat message");
        }

        Ok(message)
    }

    /// Lists a task's chat messages, newest first.
    pub async fn list_messages(
        &self,
        ctx: &RequestContext,
        task_id: i64,
        page: PageRequest,
    ) -> AppResult<PageResponse<ChatMessageView>> {
        let page = PageRequest::checked(page.page, page.page_size)?;
        self.authorize(ctx.user_id, ctx.role, task_id).await?;
        self.chats.list_for_task(task_id, page).await
    }

    /// Whether a user may join a task's chat room.
    pub async fn can_join_room(&self, user_id: i64, role: UserRole, task_id: i64) -> AppResult<bool> {
        match self.authorize(user_id, role, task_id).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind.is_server_error() => Err(e),
            Err(_) => Ok(false),
        }
    }

    /// Load the task context and run the access predicate.
    async fn authorize(
        &self,
        user_id: i64,
        role: UserRole,
        task_id: i64,
    ) -> AppResult<TaskChatContext> {
        if task_id <= 0 {
            return Err(AppError::validation("Task id must be positive"));
        }

        let chat_ctx = self
            .tasks
            .find_chat_context(task_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))?;

        if !can_access_task_chat(&chat_ctx, user_id, role) {
            return Err(AppError::forbidden("You do not have access to this task chat"));
        }
        Ok(chat_ctx)
    }
}

fn validate_content(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::validation("Message content must not be empty"));
    }
    if content.chars().count() > MAX_CHAT_CONTENT_CHARS {
        return Err(AppError::validation(format!(
            "Message content must be at most {MAX_CHAT_CONTENT_CHARS} characters"
        )));
    }
    Ok(())
}
