//! Task chat handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use planhub_core::types::PageResponse;
use planhub_entity::chat::ChatMessageView;

use crate::dto::request::CreateChatMessageRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ChatPageParams};
use crate::state::AppState;

/// POST /api/tasks/{id}/chat/messages
pub async fn create_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<i64>,
    Json(req): Json<CreateChatMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChatMessageView>>), ApiError> {
    req.validate()?;
    let message = state
        .chat_service
        .create_message(&auth, task_id, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

/// GET /api/tasks/{id}/chat/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<i64>,
    Query(params): Query<ChatPageParams>,
) -> Result<Json<ApiResponse<PageResponse<ChatMessageView>>>, ApiError> {
    params.validate()?;
    let page = state
        .chat_service
        .list_messages(&auth, task_id, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
