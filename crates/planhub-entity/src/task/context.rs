//! Role-tagged relationships between users and a task.

use serde::{Deserialize, Serialize};

use super::model::{Project, Task};
use crate::user::UserRole;

/// How a user is structurally related to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskRelation {
    /// Created the task.
    Creator,
    /// Is assigned to the task.
    Assignee,
    /// Leads the owning project.
    ProjectLead,
    /// Formulated the owning project.
    Formulator,
    /// Collaborates on the owning project.
    Collaborator,
}

/// One relationship fact. A user may appear several times with different relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskParticipant {
    /// Related user.
    pub user_id: i64,
    /// The user's global role.
    pub role: UserRole,
    /// The relationship.
    pub relation: TaskRelation,
}

/// A task together with its project and every role-tagged participant.
///
/// Loaded fresh for each access check or fan-out; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChatContext {
    /// The task.
    pub task: Task,
    /// The owning project.
    pub project: Project,
    /// Relationship facts.
    pub participants: Vec<TaskParticipant>,
}

impl TaskChatContext {
    /// All relations held by `user_id`.
    pub fn relations_of(&self, user_id: i64) -> Vec<TaskRelation> {
        self.participants
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.relation)
            .collect()
    }

    /// Whether `user_id` has any structural relationship with the task.
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }

    /// Whether `user_id` holds `relation`.
    pub fn has_relation(&self, user_id: i64, relation: TaskRelation) -> bool {
        self.participants
            .iter()
            .any(|p| p.user_id == user_id && p.relation == relation)
    }

    /// Client route of the task chat view.
    pub fn chat_url(&self) -> String {
        format!("/projects/{}/tasks/{}/chat", self.project.id, self.task.id)
    }

    /// Client route of the task view.
    pub fn task_url(&self) -> String {
        format!("/projects/{}/tasks/{}", self.project.id, self.task.id)
    }

    /// Path fragment identifying this task inside a destination URL.
    pub fn chat_url_fragment(task_id: i64) -> String {
        format!("/tasks/{task_id}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TaskChatContext {
        TaskChatContext {
            task: Task {
                id: 42,
                project_id: 1,
                title: "Zoning review".into(),
                created_by: 3,
                assignee_id: Some(9),
            },
            project: Project {
                id: 1,
                name: "North district".into(),
                lead_id: Some(3),
                formulator_id: None,
            },
            participants: vec![
                TaskParticipant { user_id: 3, role: UserRole::User, relation: TaskRelation::Creator },
                TaskParticipant { user_id: 9, role: UserRole::User, relation: TaskRelation::Assignee },
                TaskParticipant { user_id: 3, role: UserRole::User, relation: TaskRelation::ProjectLead },
            ],
        }
    }

    #[test]
    fn test_relations_of_collects_all() {
        let ctx = ctx();
        assert_eq!(
            ctx.relations_of(3),
            vec![TaskRelation::Creator, TaskRelation::ProjectLead]
        );
        assert!(ctx.relations_of(7).is_empty());
    }

    #[test]
    fn test_chat_url_contains_fragment() {
        let ctx = ctx();
        assert!(ctx.chat_url().contains(&TaskChatContext::chat_url_fragment(42)));
        assert!(!"/projects/1/tasks/420/chat".contains(&TaskChatContext::chat_url_fragment(42)));
    }
}
