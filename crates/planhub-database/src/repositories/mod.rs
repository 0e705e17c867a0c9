//! PostgreSQL repository implementations of the store traits.

pub mod chat;
pub mod notification;
pub mod task;
pub mod user;

pub use chat::ChatRepository;
pub use notification::NotificationRepository;
pub use task::TaskRepository;
pub use user::UserRepository;
