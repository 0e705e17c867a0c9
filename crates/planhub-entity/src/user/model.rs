//! User projections consumed by the core.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// Public identity of a user. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User identifier.
    pub id: i64,
    /// Human-readable display name.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Global role.
    pub role: UserRole,
}
