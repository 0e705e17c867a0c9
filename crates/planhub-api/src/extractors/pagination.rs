//! Pagination query parameter extractor.

use serde::{Deserialize, Serialize};
use validator::Validate;

use planhub_core::types::PageRequest;

/// Query parameters for the chat message listing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatPageParams {
    /// Page number (1-based, default: 1).
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u64,
    /// Items per page (default: 20, max: 100).
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

impl Default for ChatPageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl ChatPageParams {
    /// Converts to a `PageRequest`.
    pub fn into_page_request(self) -> PageRequest {
        PageRequest {
            page: self.page,
            page_size: self.limit,
        }
    }
}
