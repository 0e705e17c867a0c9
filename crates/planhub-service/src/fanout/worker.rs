//! Background delivery of fan-out jobs with bounded concurrency and retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, watch};
use tracing::{debug, error, info, warn};

use planhub_core::config::FanoutConfig;

use super::engine::FanoutJob;
use crate::notification::NotificationService;

/// Drains the fan-out queue, creating one notification per job.
///
/// Each recipient is delivered independently: one failure never blocks
/// another recipient.
#[derive(Debug)]
pub struct FanoutWorker {
    receiver: mpsc::Receiver<FanoutJob>,
    notifications: Arc<NotificationService>,
    concurrency: usize,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl FanoutWorker {
    pub(crate) fn new(
        receiver: mpsc::Receiver<FanoutJob>,
        notifications: Arc<NotificationService>,
        config: &FanoutConfig,
    ) -> Self {
        Self {
            receiver,
            notifications,
            concurrency: config.concurrency.max(1),
            max_attempts: config.max_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Run until the cancel signal fires or every engine handle is dropped.
    ///
    /// On shutdown the queue is closed, queued jobs are delivered and
    /// in-flight deliveries are awaited, all within `grace`.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>, grace: Duration) {
        info!(
            concurrency = self.concurrency,
            max_attempts = self.max_attempts,
            "Fan-out worker started"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Fan-out worker received shutdown signal");
                        break;
                    }
                }
                job = self.receiver.recv() => {
                    let Some(job) = job else {
                        info!("Fan-out queue closed");
                        break;
                    };
                    let Ok(permit) = semaphore.clone().acquire_owned().await else {
                        break;
                    };
                    let notifications = Arc::clone(&self.notifications);
                    let max_attempts = self.max_attempts;
                    let backoff = self.retry_backoff;
                    tokio::spawn(async move {
                        let _permit = permit;
                        deliver(&notifications, &job, max_attempts, backoff).await;
                    });
                }
            }
        }

        // Deferred enqueues now fail with an error log instead of landing unread.
        self.receiver.close();

        let concurrency = self.concurrency as u32;
        let flush = async {
            let pending = self.drain().await;
            if pending > 0 {
                info!(pending, "Delivered queued fan-out jobs during shutdown");
            }
            let _ = semaphore.acquire_many(concurrency).await;
        };
        if tokio::time::timeout(grace, flush).await.is_err() {
            let mut dropped = 0usize;
            while self.receiver.try_recv().is_ok() {
                dropped += 1;
            }
            warn!(
                grace_ms = grace.as_millis() as u64,
                dropped,
                "Fan-out shutdown grace period elapsed"
            );
        }
        info!("Fan-out worker stopped");
    }

    /// Deliver every job currently queued, sequentially. Returns the number processed.
    pub async fn drain(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(job) = self.receiver.try_recv() {
            deliver(&self.notifications, &job, self.max_attempts, self.retry_backoff).await;
            processed += 1;
        }
        processed
    }
}

/// Create the job's notification, retrying with linear backoff.
async fn deliver(
    notifications: &NotificationService,
    job: &FanoutJob,
    max_attempts: u32,
    backoff: Duration,
) -> bool {
    let recipient = job.recipient();
    for attempt in 1..=max_attempts {
        match notifications.create(&job.draft).await {
            Ok(notification) => {
                debug!(recipient, notification_id = notification.id, attempt, "Fan-out delivered");
                return true;
            }
            Err(e) => {
                warn!(recipient, attempt, max_attempts, error = %e, "Fan-out delivery failed");
                if attempt < max_attempts {
                    tokio::time::sleep(backoff * attempt).await;
                }
            }
        }
    }
    error!(recipient, kind = %job.draft.kind, "Fan-out delivery abandoned");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use planhub_core::config::NotificationConfig;
    use planhub_database::memory::MemoryStore;
    use planhub_entity::notification::{NewNotification, NotificationKind};

    use crate::push::RecordingPush;

    fn fast_config() -> FanoutConfig {
        FanoutConfig {
            retry_backoff_ms: 1,
            ..FanoutConfig::default()
        }
    }

    fn notifications(store: &MemoryStore) -> Arc<NotificationService> {
        Arc::new(NotificationService::new(
            Arc::new(store.clone()),
            Arc::new(RecordingPush::new()),
            &NotificationConfig::default(),
        ))
    }

    fn job(user_id: i64) -> FanoutJob {
        FanoutJob {
            draft: NewNotification::new(user_id, NotificationKind::TaskDueSoon, "due"),
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_transient_failure() {
        let store = MemoryStore::new();
        store.fail_notifications_for(3, 2).await;

        let delivered = deliver(&notifications(&store), &job(3), 3, Duration::from_millis(1)).await;
        assert!(delivered);
        assert_eq!(store.notifications_for(3).await.len(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_recipient_does_not_block_others() {
        let store = MemoryStore::new();
        store.fail_notifications_for(3, 10).await;
        let (sender, receiver) = mpsc::channel(8);
        let mut worker = FanoutWorker::new(receiver, notifications(&store), &fast_config());

        sender.send(job(3)).await.unwrap();
        sender.send(job(9)).await.unwrap();
        assert_eq!(worker.drain().await, 2);

        assert!(store.notifications_for(3).await.is_empty());
        assert_eq!(store.notifications_for(9).await.len(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel_and_flushes_queue() {
        let store = MemoryStore::new();
        let (sender, receiver) = mpsc::channel(8);
        let worker = FanoutWorker::new(receiver, notifications(&store), &fast_config());
        sender.send(job(9)).await.unwrap();

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(worker.run(cancel_rx, Duration::from_secs(5)));
        cancel_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(store.notifications_for(9).await.len(), 1);
        assert!(sender.try_send(job(9)).is_err());
    }

    #[tokio::test]
    async fn test_shutdown_is_bounded_by_grace() {
        let store = MemoryStore::new();
        store.fail_notifications_for(3, 10).await;
        let config = FanoutConfig {
            retry_backoff_ms: 60_000,
            ..FanoutConfig::default()
        };
        let (sender, receiver) = mpsc::channel(8);
        let worker = FanoutWorker::new(receiver, notifications(&store), &config);
        sender.send(job(3)).await.unwrap();

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(worker.run(cancel_rx, Duration::from_millis(50)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel_tx.send(true).unwrap();

        let stopped = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(stopped.is_ok());
        assert!(store.notifications_for(3).await.is_empty());
    }
}
