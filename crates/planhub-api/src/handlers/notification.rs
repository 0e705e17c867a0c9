//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use planhub_entity::notification::{Notification, UnreadCounts};
use planhub_service::NotificationList;

use crate::dto::request::{MarkAllReadQuery, NotificationQuery};
use crate::dto::response::{ApiResponse, CountResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<ApiResponse<NotificationList>>, ApiError> {
    let category = query.category()?;
    let result = state
        .notification_service
        .list(&auth, query.only_unread, category)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UnreadCounts>>, ApiError> {
    let counts = state.notification_service.unread_counts(&auth).await?;
    Ok(Json(ApiResponse::ok(counts)))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Notification>>, ApiError> {
    let notification = state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<MarkAllReadQuery>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let category = query.category()?;
    let count = state
        .notification_service
        .mark_all_read(&auth, category)
        .await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/tasks/{id}/chat/notifications/read
pub async fn mark_task_chat_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<i64>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state
        .notification_service
        .mark_task_chat_read(&auth, task_id)
        .await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}
