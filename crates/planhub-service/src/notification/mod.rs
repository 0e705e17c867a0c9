//! Notification lifecycle: creation, listing, read-state transitions, and
//! unread-count publishing.

pub mod service;

pub use service::{NotificationList, NotificationService};
