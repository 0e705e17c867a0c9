//! Task and project models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A task inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: i64,
    /// Owning project.
    pub project_id: i64,
    /// Task title.
    pub title: String,
    /// User who created the task.
    pub created_by: i64,
    /// Currently assigned user.
    pub assignee_id: Option<i64>,
}

/// A planning project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project identifier.
    pub id: i64,
    /// Project name.
    pub name: String,
    /// Project lead.
    pub lead_id: Option<i64>,
    /// Project formulator.
    pub formulator_id: Option<i64>,
}
