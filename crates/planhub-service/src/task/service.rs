//! Task assignment with assignee notification.

use std::sync::Arc;

use tracing::info;

use planhub_core::error::AppError;
use planhub_core::result::AppResult;
use planhub_database::store::{TaskStore, UserStore};
use planhub_entity::task::{Task, TaskChatContext, TaskRelation};

use crate::context::RequestContext;
use crate::fanout::FanoutEngine;

/// Assigns tasks and notifies the new assignee.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
    fanout: FanoutEngine,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService").finish_non_exhaustive()
    }
}

impl TaskService {
    /// Creates a new task service.
    pub fn new(tasks: Arc<dyn TaskStore>, users: Arc<dyn UserStore>, fanout: FanoutEngine) -> Self {
        Self {
            tasks,
            users,
            fanout,
        }
    }

    /// Assigns `task_id` to `assignee_id`.
    ///
    /// Allowed for privileged roles, the project lead, and the task creator.
    pub async fn assign(
        &self,
        ctx: &RequestContext,
        task_id: i64,
        assignee_id: i64,
    ) -> AppResult<Task> {
        if task_id <= 0 || assignee_id <= 0 {
            return Err(AppError::validation("Task and assignee ids must be positive"));
        }

        let chat_ctx = self
            .tasks
            .find_chat_context(task_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))?;

        let may_assign = ctx.is_privileged()
            || chat_ctx.has_relation(ctx.user_id, TaskRelation::ProjectLead)
            || chat_ctx.has_relation(ctx.user_id, TaskRelation::Creator);
        if !may_assign {
            return Err(AppError::forbidden("You may not assign this task"));
        }

        if self.users.find_summary(assignee_id).await?.is_none() {
            return Err(AppError::validation(format!("User {assignee_id} does not exist")));
        }

        let previous = chat_ctx.task.assignee_id;
        let task = self.tasks.update_assignee(task_id, assignee_id).await?;
        info!(task_id, assignee_id, actor_id = ctx.user_id, "Task assigned");

        if previous != Some(assignee_id) {
            let updated = TaskChatContext {
                task: task.clone(),
                ..chat_ctx
            };
            self.fanout
                .notify_task_assigned(&updated, ctx.user_id, &ctx.username);
        }
        Ok(task)
    }
}
