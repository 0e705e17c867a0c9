//! # planhub-api
//!
//! HTTP API layer for PlanHub built on Axum.
//!
//! Provides the task chat, notification, and assignment endpoints, the
//! WebSocket upgrade, middleware (logging, CORS), extractors, DTOs, and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::{AppState, Stores};
