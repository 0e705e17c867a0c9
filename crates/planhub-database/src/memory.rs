//! In-memory implementation of every store trait.
//!
//! Used by service and API tests so they run without PostgreSQL. State lives
//! behind a single `tokio::sync::RwLock`, which gives each operation the same
//! single-row atomicity the database provides.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use planhub_core::error::AppError;
use planhub_core::result::AppResult;
use planhub_core::types::{PageRequest, PageResponse};
use planhub_entity::chat::{ChatMessage, ChatMessageView};
use planhub_entity::notification::{
    NewNotification, Notification, NotificationCategory, NotificationKind, ReadTransition,
    UnreadCounts,
};
use planhub_entity::task::{Project, Task, TaskChatContext, TaskParticipant, TaskRelation};
use planhub_entity::user::UserSummary;

use crate::store::{ChatStore, NotificationStore, TaskStore, UserStore};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<i64, UserSummary>,
    projects: HashMap<i64, Project>,
    collaborators: HashMap<i64, Vec<i64>>,
    tasks: HashMap<i64, Task>,
    chat_messages: Vec<ChatMessage>,
    notifications: Vec<Notification>,
    /// Remaining forced `create` failures per recipient.
    failing_recipients: HashMap<i64, u32>,
    next_chat_id: i64,
    next_notification_id: i64,
}

/// Shared in-memory store. Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user.
    pub async fn insert_user(&self, user: UserSummary) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Seed a project with its collaborators.
    pub async fn insert_project(&self, project: Project, collaborators: Vec<i64>) {
        let mut state = self.state.write().await;
        state.collaborators.insert(project.id, collaborators);
        state.projects.insert(project.id, project);
    }

    /// Seed a task.
    pub async fn insert_task(&self, task: Task) {
        self.state.write().await.tasks.insert(task.id, task);
    }

    /// Make the next `times` notification inserts for `user_id` fail.
    pub async fn fail_notifications_for(&self, user_id: i64, times: u32) {
        self.state
            .write()
            .await
            .failing_recipients
            .insert(user_id, times);
    }

    /// Every notification owned by `user_id`, oldest first.
    pub async fn notifications_for(&self, user_id: i64) -> Vec<Notification> {
        self.state
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Every stored chat message of `task_id`, oldest first.
    pub async fn chat_messages(&self, task_id: i64) -> Vec<ChatMessage> {
        self.state
            .read()
            .await
            .chat_messages
            .iter()
            .filter(|m| m.task_id == task_id)
            .cloned()
            .collect()
    }
}

fn mark(notification: &mut Notification) {
    notification.is_read = true;
    notification.read_at = Some(Utc::now());
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, draft: &NewNotification) -> AppResult<Notification> {
        let mut state = self.state.write().await;

        if let Some(remaining) = state.failing_recipients.get_mut(&draft.user_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AppError::database("Simulated notification insert failure"));
            }
        }

        state.next_notification_id += 1;
        let notification = Notification {
            id: state.next_notification_id,
            user_id: draft.user_id,
            kind: draft.kind,
            category: draft.category(),
            message: draft.message.clone(),
            destination_url: draft.destination_url.clone(),
            resource_id: draft.resource_id,
            resource_kind: draft.resource_kind.clone(),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        category: Option<NotificationCategory>,
        limit: u32,
    ) -> AppResult<Vec<Notification>> {
        let state = self.state.read().await;
        let mut items: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .filter(|n| !unread_only || n.is_unread())
            .filter(|n| category.is_none_or(|c| n.category == c))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn mark_read(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> AppResult<Option<ReadTransition>> {
        let mut state = self.state.write().await;
        let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
        else {
            return Ok(None);
        };

        if notification.is_read {
            return Ok(Some(ReadTransition::AlreadyRead(notification.clone())));
        }
        mark(notification);
        Ok(Some(ReadTransition::Transitioned(notification.clone())))
    }

    async fn mark_all_read(
        &self,
        user_id: i64,
        category: Option<NotificationCategory>,
    ) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut count = 0;
        for n in state.notifications.iter_mut().filter(|n| {
            n.user_id == user_id && n.is_unread() && category.is_none_or(|c| n.category == c)
        }) {
            mark(n);
            count += 1;
        }
        Ok(count)
    }

    async fn mark_read_by_resource(
        &self,
        user_id: i64,
        kinds: &[NotificationKind],
        url_fragment: &str,
    ) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut count = 0;
        for n in state.notifications.iter_mut().filter(|n| {
            n.user_id == user_id
                && n.is_unread()
                && kinds.contains(&n.kind)
                && n
                    .destination_url
                    .as_deref()
                    .is_some_and(|url| url.contains(url_fragment))
        }) {
            mark(n);
            count += 1;
        }
        Ok(count)
    }

    async fn unread_counts(&self, user_id: i64) -> AppResult<UnreadCounts> {
        let state = self.state.read().await;
        let mut counts = UnreadCounts::default();
        for n in state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.is_unread())
        {
            match n.category {
                NotificationCategory::System => counts.system_count += 1,
                NotificationCategory::Chat => counts.chat_count += 1,
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn create(
        &self,
        task_id: i64,
        sender_id: i64,
        content: &str,
    ) -> AppResult<ChatMessageView> {
        let mut state = self.state.write().await;
        let sender = state
            .users
            .get(&sender_id)
            .cloned()
            .ok_or_else(|| AppError::database(format!("Unknown sender {sender_id}")))?;
        if !state.tasks.contains_key(&task_id) {
            return Err(AppError::database(format!("Unknown task {task_id}")));
        }

        state.next_chat_id += 1;
        let message = ChatMessage {
            id: state.next_chat_id,
            task_id,
            sender_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        state.chat_messages.push(message.clone());
        Ok(ChatMessageView::new(message, sender))
    }

    async fn list_for_task(
        &self,
        task_id: i64,
        page: PageRequest,
    ) -> AppResult<PageResponse<ChatMessageView>> {
        let state = self.state.read().await;
        let mut messages: Vec<&ChatMessage> = state
            .chat_messages
            .iter()
            .filter(|m| m.task_id == task_id)
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = messages.len() as u64;
        let items = messages
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .filter_map(|m| {
                state
                    .users
                    .get(&m.sender_id)
                    .map(|sender| ChatMessageView::new(m.clone(), sender.clone()))
            })
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn find_chat_context(&self, task_id: i64) -> AppResult<Option<TaskChatContext>> {
        let state = self.state.read().await;
        let Some(task) = state.tasks.get(&task_id).cloned() else {
            return Ok(None);
        };
        let project = state
            .projects
            .get(&task.project_id)
            .cloned()
            .ok_or_else(|| AppError::database(format!("Task {task_id} has no project")))?;

        let mut facts = vec![(task.created_by, TaskRelation::Creator)];
        if let Some(assignee) = task.assignee_id {
            facts.push((assignee, TaskRelation::Assignee));
        }
        if let Some(lead) = project.lead_id {
            facts.push((lead, TaskRelation::ProjectLead));
        }
        if let Some(formulator) = project.formulator_id {
            facts.push((formulator, TaskRelation::Formulator));
        }
        for user_id in state.collaborators.get(&project.id).into_iter().flatten() {
            facts.push((*user_id, TaskRelation::Collaborator));
        }

        let participants = facts
            .into_iter()
            .filter_map(|(user_id, relation)| {
                state.users.get(&user_id).map(|u| TaskParticipant {
                    user_id,
                    role: u.role,
                    relation,
                })
            })
            .collect();

        Ok(Some(TaskChatContext {
            task,
            project,
            participants,
        }))
    }

    async fn update_assignee(&self, task_id: i64, assignee_id: i64) -> AppResult<Task> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))?;
        task.assignee_id = Some(assignee_id);
        Ok(task.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_summary(&self, user_id: i64) -> AppResult<Option<UserSummary>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }
}
