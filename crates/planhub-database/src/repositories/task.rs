//! Task repository implementation.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::warn;

use planhub_core::error::{AppError, ErrorKind};
use planhub_core::result::AppResult;
use planhub_entity::task::{Project, Task, TaskChatContext, TaskParticipant, TaskRelation};
use planhub_entity::user::UserRole;

use crate::store::TaskStore;

#[derive(Debug, FromRow)]
struct ParticipantRow {
    user_id: i64,
    role: UserRole,
    relation: String,
}

fn parse_relation(value: &str) -> Option<TaskRelation> {
    match value {
        "creator" => Some(TaskRelation::Creator),
        "assignee" => Some(TaskRelation::Assignee),
        "project_lead" => Some(TaskRelation::ProjectLead),
        "formulator" => Some(TaskRelation::Formulator),
        "collaborator" => Some(TaskRelation::Collaborator),
        _ => None,
    }
}

/// Repository for tasks and their project relationships.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn find_chat_context(&self, task_id: i64) -> AppResult<Option<TaskChatContext>> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, project_id, title, created_by, assignee_id FROM tasks WHERE id = $1",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find task", e))?;

        let Some(task) = task else {
            return Ok(None);
        };

        let project = sqlx::query_as::<_, Project>(
            "SELECT id, name, lead_id, formulator_id FROM projects WHERE id = $1",
        )
        .bind(task.project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find project", e))?;

        let rows = sqlx::query_as::<_, ParticipantRow>(
            "SELECT p.user_id, u.role, p.relation FROM ( \
                SELECT created_by AS user_id, 'creator' AS relation FROM tasks WHERE id = $1 \
                UNION ALL \
                SELECT assignee_id, 'assignee' FROM tasks WHERE id = $1 AND assignee_id IS NOT NULL \
                UNION ALL \
                SELECT lead_id, 'project_lead' FROM projects WHERE id = $2 AND lead_id IS NOT NULL \
                UNION ALL \
                SELECT formulator_id, 'formulator' FROM projects WHERE id = $2 AND formulator_id IS NOT NULL \
                UNION ALL \
                SELECT user_id, 'collaborator' FROM project_collaborators WHERE project_id = $2 \
             ) p JOIN users u ON u.id = p.user_id",
        )
        .bind(task.id)
        .bind(project.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load task participants", e))?;

        let participants = rows
            .into_iter()
            .filter_map(|row| match parse_relation(&row.relation) {
                Some(relation) => Some(TaskParticipant {
                    user_id: row.user_id,
                    role: row.role,
                    relation,
                }),
                None => {
                    warn!(relation = %row.relation, "Unknown task relation");
                    None
                }
            })
            .collect();

        Ok(Some(TaskChatContext {
            task,
            project,
            participants,
        }))
    }

    async fn update_assignee(&self, task_id: i64, assignee_id: i64) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET assignee_id = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING id, project_id, title, created_by, assignee_id",
        )
        .bind(task_id)
        .bind(assignee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update task assignee", e))?
        .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))
    }
}
