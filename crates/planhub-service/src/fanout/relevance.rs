//! Interested-party computation and the per-role relevance rule.

use planhub_entity::task::{TaskChatContext, TaskRelation};
use planhub_entity::user::UserRole;

/// A user structurally related to a task, with every relation they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestedParty {
    /// The user.
    pub user_id: i64,
    /// Their global role.
    pub role: UserRole,
    /// Their relations to the task, in discovery order.
    pub relations: Vec<TaskRelation>,
}

impl InterestedParty {
    fn holds_any(&self, relations: &[TaskRelation]) -> bool {
        self.relations.iter().any(|r| relations.contains(r))
    }
}

/// Collapse the participant facts of `ctx` into one entry per user, dropping `exclude`.
pub fn interested_parties(ctx: &TaskChatContext, exclude: i64) -> Vec<InterestedParty> {
    let mut parties: Vec<InterestedParty> = Vec::new();
    for p in ctx.participants.iter().filter(|p| p.user_id != exclude) {
        match parties.iter_mut().find(|party| party.user_id == p.user_id) {
            Some(party) => {
                if !party.relations.contains(&p.relation) {
                    party.relations.push(p.relation);
                }
            }
            None => parties.push(InterestedParty {
                user_id: p.user_id,
                role: p.role,
                relations: vec![p.relation],
            }),
        }
    }
    parties
}

/// Whether a party should be notified about task chat activity.
///
/// Non-privileged users are always relevant. Privileged users see every
/// chat anyway, so they are notified only when directly responsible for
/// the task: as its creator, its assignee, or the project lead.
pub fn classify_relevance(party: &InterestedParty) -> bool {
    if !party.role.is_privileged() {
        return true;
    }
    party.holds_any(&[
        TaskRelation::Creator,
        TaskRelation::Assignee,
        TaskRelation::ProjectLead,
    ])
}

/// Users that receive a notification for a chat message sent by `sender_id`.
pub fn chat_recipients(ctx: &TaskChatContext, sender_id: i64) -> Vec<i64> {
    interested_parties(ctx, sender_id)
        .iter()
        .filter(|party| classify_relevance(party))
        .map(|party| party.user_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use planhub_entity::task::{Project, Task, TaskParticipant};

    fn fact(user_id: i64, role: UserRole, relation: TaskRelation) -> TaskParticipant {
        TaskParticipant {
            user_id,
            role,
            relation,
        }
    }

    fn ctx(participants: Vec<TaskParticipant>) -> TaskChatContext {
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
            participants,
        }
    }

    #[test]
    fn test_parties_are_deduplicated_and_exclude_sender() {
        let ctx = ctx(vec![
            fact(3, UserRole::User, TaskRelation::Creator),
            fact(9, UserRole::User, TaskRelation::Assignee),
            fact(3, UserRole::User, TaskRelation::ProjectLead),
            fact(7, UserRole::User, TaskRelation::Collaborator),
        ]);

        let parties = interested_parties(&ctx, 7);
        assert_eq!(parties.len(), 2);
        assert_eq!(parties[0].user_id, 3);
        assert_eq!(
            parties[0].relations,
            vec![TaskRelation::Creator, TaskRelation::ProjectLead]
        );
        assert!(parties.iter().all(|p| p.user_id != 7));
    }

    #[test]
    fn test_non_privileged_collaborator_is_relevant() {
        let party = InterestedParty {
            user_id: 5,
            role: UserRole::User,
            relations: vec![TaskRelation::Collaborator],
        };
        assert!(classify_relevance(&party));
    }

    #[test]
    fn test_privileged_collaborator_is_not_relevant() {
        for role in [UserRole::Admin, UserRole::Coordinator] {
            let party = InterestedParty {
                user_id: 5,
                role,
                relations: vec![TaskRelation::Collaborator, TaskRelation::Formulator],
            };
            assert!(!classify_relevance(&party), "{role}");
        }
    }

    #[test]
    fn test_privileged_direct_relations_are_relevant() {
        for relation in [
            TaskRelation::Creator,
            TaskRelation::Assignee,
            TaskRelation::ProjectLead,
        ] {
            let party = InterestedParty {
                user_id: 5,
                role: UserRole::Coordinator,
                relations: vec![relation],
            };
            assert!(classify_relevance(&party), "{relation:?}");
        }
    }

    #[test]
    fn test_chat_recipients_scenario() {
        let ctx = ctx(vec![
            fact(3, UserRole::User, TaskRelation::Creator),
            fact(9, UserRole::User, TaskRelation::Assignee),
            fact(3, UserRole::User, TaskRelation::ProjectLead),
            fact(7, UserRole::User, TaskRelation::Collaborator),
            fact(11, UserRole::Admin, TaskRelation::Collaborator),
        ]);
        assert_eq!(chat_recipients(&ctx, 7), vec![3, 9]);
    }
}
