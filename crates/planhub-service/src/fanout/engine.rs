//! Fan-out dispatch: turns task events into per-recipient delivery jobs.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info};

use planhub_core::config::FanoutConfig;
use planhub_entity::chat::ChatMessageView;
use planhub_entity::notification::{NewNotification, NotificationKind};
use planhub_entity::task::TaskChatContext;

use super::relevance::chat_recipients;
use super::worker::FanoutWorker;
use crate::notification::NotificationService;

/// Resource kind tag for chat message references.
pub const RESOURCE_CHAT_MESSAGE: &str = "chat_message";
/// Resource kind tag for task references.
pub const RESOURCE_TASK: &str = "task";

/// One notification to deliver to one recipient.
///
/// The recipient set is fixed when the job is built, so a retry never
/// re-derives interested parties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutJob {
    /// The notification to create.
    pub draft: NewNotification,
}

impl FanoutJob {
    /// The recipient of this job.
    pub fn recipient(&self) -> i64 {
        self.draft.user_id
    }
}

/// Enqueues notification deliveries for the background [`FanoutWorker`].
///
/// Enqueueing never blocks the caller and never fails the primary operation.
#[derive(Debug, Clone)]
pub struct FanoutEngine {
    sender: mpsc::Sender<FanoutJob>,
}

impl FanoutEngine {
    /// Create an engine and the worker that drains its queue.
    pub fn new(notifications: Arc<NotificationService>, config: &FanoutConfig) -> (Self, FanoutWorker) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        (Self { sender }, FanoutWorker::new(receiver, notifications, config))
    }

    /// Notify interested parties about a new task chat message.
    ///
    /// Returns the number of recipients enqueued.
    pub fn notify_task_chat_message(&self, ctx: &TaskChatContext, message: &ChatMessageView) -> usize {
        let text = format!(
            "{} sent a message on task '{}' of project '{}'.",
            message.sender.display_name, ctx.task.title, ctx.project.name
        );
        let url = ctx.chat_url();

        let recipients = chat_recipients(ctx, message.sender.id);
        debug!(
            task_id = ctx.task.id,
            message_id = message.id,
            recipients = ?recipients,
            "Chat fan-out computed"
        );

        for user_id in &recipients {
            self.enqueue(FanoutJob {
                draft: NewNotification::new(*user_id, NotificationKind::NewChatMessage, text.clone())
                    .with_destination(url.clone())
                    .with_resource(message.id, RESOURCE_CHAT_MESSAGE),
            });
        }
        recipients.len()
    }

    /// Notify the assignee of a task, unless they assigned it to themselves.
    ///
    /// Returns whether a notification was enqueued.
    pub fn notify_task_assigned(&self, ctx: &TaskChatContext, actor_id: i64, actor_name: &str) -> bool {
        let Some(assignee_id) = ctx.task.assignee_id else {
            return false;
        };
        if assignee_id == actor_id {
            debug!(task_id = ctx.task.id, "Self-assignment, no notification");
            return false;
        }

        let text = format!(
            "{} assigned you the task '{}' of project '{}'.",
            actor_name, ctx.task.title, ctx.project.name
        );
        self.enqueue(FanoutJob {
            draft: NewNotification::new(assignee_id, NotificationKind::NewTaskAssigned, text)
                .with_destination(ctx.task_url())
                .with_resource(ctx.task.id, RESOURCE_TASK),
        });
        info!(task_id = ctx.task.id, assignee_id, "Assignment notification enqueued");
        true
    }

    fn enqueue(&self, job: FanoutJob) {
        match self.sender.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                debug!(recipient = job.recipient(), "Fan-out queue full, deferring enqueue");
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let recipient = job.recipient();
                    if sender.send(job).await.is_err() {
                        error!(recipient, "Fan-out queue closed, notification dropped");
                    }
                });
            }
            Err(TrySendError::Closed(job)) => {
                error!(recipient = job.recipient(), "Fan-out queue closed, notification dropped");
            }
        }
    }
}
