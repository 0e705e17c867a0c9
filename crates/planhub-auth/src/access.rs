//! Task chat access predicate.
//!
//! A pure function over an already-loaded [`TaskChatContext`]; it performs
//! no I/O and is safe to call concurrently.

use planhub_entity::task::TaskChatContext;
use planhub_entity::user::UserRole;

/// Whether a user may read and write the chat of the task in `ctx`.
///
/// Privileged roles always pass. Anyone else must be the task creator or
/// assignee, or the lead, formulator, or a collaborator of the project.
pub fn can_access_task_chat(ctx: &TaskChatContext, user_id: i64, role: UserRole) -> bool {
    role.is_privileged() || ctx.is_participant(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use planhub_entity::task::{Project, Task, TaskParticipant, TaskRelation};

    fn participant(user_id: i64, relation: TaskRelation) -> TaskParticipant {
        TaskParticipant {
            user_id,
            role: UserRole::User,
            relation,
        }
    }

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
                formulator_id: Some(5),
            },
            participants: vec![
                participant(3, TaskRelation::Creator),
                participant(9, TaskRelation::Assignee),
                participant(3, TaskRelation::ProjectLead),
                participant(5, TaskRelation::Formulator),
                participant(7, TaskRelation::Collaborator),
            ],
        }
    }

    #[test]
    fn test_privileged_roles_always_pass() {
        let ctx = ctx();
        assert!(can_access_task_chat(&ctx, 100, UserRole::Admin));
        assert!(can_access_task_chat(&ctx, 100, UserRole::Coordinator));
    }

    #[test]
    fn test_every_relation_grants_access() {
        let ctx = ctx();
        for user_id in [3, 5, 7, 9] {
            assert!(can_access_task_chat(&ctx, user_id, UserRole::User), "user {user_id}");
        }
    }

    #[test]
    fn test_unrelated_user_is_denied() {
        assert!(!can_access_task_chat(&ctx(), 100, UserRole::User));
    }
}
