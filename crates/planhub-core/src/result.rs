//! Convenience result type alias for PlanHub.

use crate::error::AppError;

/// A specialized `Result` type for PlanHub operations.
pub type AppResult<T> = Result<T, AppError>;
