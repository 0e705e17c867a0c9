//! Notification domain entities.

pub mod category;
pub mod counts;
pub mod kind;
pub mod model;

pub use category::NotificationCategory;
pub use counts::UnreadCounts;
pub use kind::NotificationKind;
pub use model::{NewNotification, Notification, ReadTransition};
