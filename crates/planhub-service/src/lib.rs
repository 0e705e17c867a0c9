//! # planhub-service
//!
//! Business logic service layer for PlanHub. Each service orchestrates the
//! store traits from `planhub-database` and the [`PushChannel`] to implement
//! application-level use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod chat;
pub mod context;
pub mod fanout;
pub mod notification;
pub mod push;
pub mod task;

pub use chat::ChatService;
pub use context::RequestContext;
pub use fanout::{FanoutEngine, FanoutWorker};
pub use notification::{NotificationList, NotificationService};
pub use push::PushChannel;
pub use task::TaskService;
