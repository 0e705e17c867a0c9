//! # planhub-auth
//!
//! Authentication and authorization for PlanHub.
//!
//! ## Modules
//!
//! - `jwt`: JWT claims, token creation, and validation
//! - `access`: the task-chat access predicate

pub mod access;
pub mod jwt;

pub use access::can_access_task_chat;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
