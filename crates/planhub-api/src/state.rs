//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use planhub_auth::jwt::JwtDecoder;
use planhub_core::config::AppConfig;
use planhub_database::store::{ChatStore, NotificationStore, TaskStore, UserStore};
use planhub_realtime::server::RealtimeEngine;
use planhub_service::push::PushChannel;
use planhub_service::{ChatService, FanoutEngine, FanoutWorker, NotificationService, TaskService};

/// Storage backends the services are built on.
#[derive(Clone)]
pub struct Stores {
    /// Notification persistence.
    pub notifications: Arc<dyn NotificationStore>,
    /// Chat message persistence.
    pub chats: Arc<dyn ChatStore>,
    /// Task and participant lookups.
    pub tasks: Arc<dyn TaskStore>,
    /// User lookups.
    pub users: Arc<dyn UserStore>,
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
    /// Notification reads and unread-count publishing
    pub notification_service: Arc<NotificationService>,
    /// Task chat
    pub chat_service: Arc<ChatService>,
    /// Task assignment
    pub task_service: Arc<TaskService>,
}

impl AppState {
    /// Wires services on top of `stores` and the realtime engine.
    ///
    /// The returned worker must be spawned for notifications to be delivered.
    pub fn build(config: AppConfig, stores: Stores) -> (Self, FanoutWorker) {
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone()));
        let push: Arc<dyn PushChannel> = realtime.publisher();
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let notification_service = Arc::new(NotificationService::new(
            Arc::clone(&stores.notifications),
            Arc::clone(&push),
            &config.notifications,
        ));
        let (fanout, worker) =
            FanoutEngine::new(Arc::clone(&notification_service), &config.fanout);

        let chat_service = Arc::new(ChatService::new(
            Arc::clone(&stores.tasks),
            Arc::clone(&stores.chats),
            fanout.clone(),
            push,
        ));
        let task_service = Arc::new(TaskService::new(
            Arc::clone(&stores.tasks),
            Arc::clone(&stores.users),
            fanout,
        ));

        let state = Self {
            config: Arc::new(config),
            jwt_decoder,
            realtime,
            notification_service,
            chat_service,
            task_service,
        };
        (state, worker)
    }
}
