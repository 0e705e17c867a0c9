//! Notification category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a notification, derived from its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_category", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationCategory {
    /// Workflow notifications (assignments, status changes, due dates).
    System,
    /// Task chat notifications (messages and mentions).
    Chat,
}

impl NotificationCategory {
    /// Return the category in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Chat => "CHAT",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationCategory {
    type Err = planhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SYSTEM" => Ok(Self::System),
            "CHAT" => Ok(Self::Chat),
            _ => Err(planhub_core::AppError::validation(format!(
                "Invalid notification category: '{s}'. Expected one of: SYSTEM, CHAT"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("chat".parse::<NotificationCategory>().unwrap(), NotificationCategory::Chat);
        assert_eq!("System".parse::<NotificationCategory>().unwrap(), NotificationCategory::System);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "EMAIL".parse::<NotificationCategory>().unwrap_err();
        assert_eq!(err.kind, planhub_core::ErrorKind::Validation);
    }

    #[test]
    fn test_serializes_uppercase() {
        let json = serde_json::to_string(&NotificationCategory::Chat).unwrap();
        assert_eq!(json, "\"CHAT\"");
    }
}
