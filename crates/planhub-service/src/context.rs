//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use planhub_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built by the API layer from the verified JWT and passed into service
/// methods so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: i64,
    /// The user's role at the time the JWT was issued.
    pub role: UserRole,
    /// The username (convenience field from JWT claims).
    pub username: String,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: i64,
        role: UserRole,
        username: String,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            role,
            username,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the caller holds a privileged global role.
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}
