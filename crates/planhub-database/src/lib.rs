//! # planhub-database
//!
//! PostgreSQL connection management, the store traits consumed by the
//! service layer, and their concrete repository implementations.

pub mod connection;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{ChatStore, NotificationStore, TaskStore, UserStore};
