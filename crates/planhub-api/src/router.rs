//! Route definitions for the PlanHub HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at `/ws`.

use axum::{
    Router,
    routing::{get, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route, threading `state` through.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(chat_routes())
        .merge(notification_routes())
        .merge(task_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .with_state(state)
}

/// Task chat endpoints
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks/{id}/chat/messages",
            get(handlers::chat::list_messages).post(handlers::chat::create_message),
        )
        .route(
            "/tasks/{id}/chat/notifications/read",
            put(handlers::notification::mark_task_chat_read),
        )
}

/// Notification endpoints
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::notification::list_notifications))
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
}

/// Task endpoints
fn task_routes() -> Router<AppState> {
    Router::new().route("/tasks/{id}/assignee", put(handlers::task::assign))
}

/// Health endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
