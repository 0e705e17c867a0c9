//! User domain entities.

pub mod model;
pub mod role;

pub use model::UserSummary;
pub use role::UserRole;
