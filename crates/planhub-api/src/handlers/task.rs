//! Task assignment handler.

use axum::Json;
use axum::extract::{Path, State};
use validator::Validate;

use planhub_entity::task::Task;

use crate::dto::request::AssignTaskRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// PUT /api/tasks/{id}/assignee
pub async fn assign(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<i64>,
    Json(req): Json<AssignTaskRequest>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    req.validate()?;
    let task = state
        .task_service
        .assign(&auth, task_id, req.assignee_id)
        .await?;
    Ok(Json(ApiResponse::ok(task)))
}
