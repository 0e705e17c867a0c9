//! # planhub-realtime
//!
//! Real-time WebSocket engine for PlanHub. Provides:
//!
//! - WebSocket connection management with JWT authentication
//! - Pub/sub channels: one `user:{id}` channel per user and one
//!   `task:{id}:chat` room per task chat
//! - [`RealtimePublisher`], the [`planhub_service::PushChannel`] implementation
//!   that delivers unread counts and chat messages to connected clients

pub mod channel;
pub mod connection;
pub mod guard;
pub mod message;
pub mod publisher;
pub mod server;

pub use channel::registry::ChannelRegistry;
pub use connection::manager::ConnectionManager;
pub use guard::SubscriptionGuard;
pub use publisher::RealtimePublisher;
pub use server::RealtimeEngine;
