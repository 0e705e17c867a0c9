//! Request DTOs with validation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use planhub_core::error::AppError;
use planhub_entity::notification::NotificationCategory;

/// Chat message body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateChatMessageRequest {
    /// Message text.
    #[validate(length(
        min = 1,
        max = 2000,
        message = "content must be between 1 and 2000 characters"
    ))]
    pub content: String,
}

/// Filters for the notification listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    /// Only return unread notifications.
    #[serde(default)]
    pub only_unread: bool,
    /// `SYSTEM` or `CHAT`, case-insensitive.
    pub category: Option<String>,
}

impl NotificationQuery {
    /// Parses the category filter.
    pub fn category(&self) -> Result<Option<NotificationCategory>, AppError> {
        parse_category(self.category.as_deref())
    }
}

/// Optional category for mark-all-read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkAllReadQuery {
    /// `SYSTEM` or `CHAT`, case-insensitive.
    pub category: Option<String>,
}

impl MarkAllReadQuery {
    /// Parses the category filter.
    pub fn category(&self) -> Result<Option<NotificationCategory>, AppError> {
        parse_category(self.category.as_deref())
    }
}

/// Task assignment body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskRequest {
    /// The new assignee.
    #[validate(range(min = 1, message = "assigneeId must be positive"))]
    pub assignee_id: i64,
}

fn parse_category(raw: Option<&str>) -> Result<Option<NotificationCategory>, AppError> {
    match raw {
        None => Ok(None),
        Some(s) => NotificationCategory::from_str(s).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planhub_entity::chat::MAX_CHAT_CONTENT_CHARS;

    #[test]
    fn test_category_is_case_insensitive() {
        let query = NotificationQuery {
            only_unread: false,
            category: Some("chat".into()),
        };
        assert_eq!(query.category().expect("parse"), Some(NotificationCategory::Chat));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let query = MarkAllReadQuery {
            category: Some("URGENT".into()),
        };
        assert!(query.category().is_err());
    }

    #[test]
    fn test_content_length_bounds() {
        let empty = CreateChatMessageRequest {
            content: String::new(),
        };
        assert!(empty.validate().is_err());

        let max = CreateChatMessageRequest {
            content: "ñ".repeat(MAX_CHAT_CONTENT_CHARS),
        };
        assert!(max.validate().is_ok());

        let over = CreateChatMessageRequest {
            content: "a".repeat(MAX_CHAT_CONTENT_CHARS + 1),
        };
        assert!(over.validate().is_err());
    }
}
