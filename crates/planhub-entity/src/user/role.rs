//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Global roles assigned to users.
///
/// Administrators and coordinators are privileged: they can see every task
/// chat, but only receive chat notifications for tasks they are directly
/// involved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// System administrator.
    Admin,
    /// Planning coordinator.
    Coordinator,
    /// Regular staff member.
    User,
}

impl UserRole {
    /// Whether this role bypasses per-task relationship checks.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin | Self::Coordinator)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Coordinator => "coordinator",
            Self::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = planhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "coordinator" => Ok(Self::Coordinator),
            "user" => Ok(Self::User),
            _ => Err(planhub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, coordinator, user"
            ))),
        }
    }
}
