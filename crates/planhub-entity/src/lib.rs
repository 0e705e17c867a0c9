//! # planhub-entity
//!
//! Domain entity models for PlanHub. Every struct in this crate represents a
//! database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`; value objects that cross the wire derive `Serialize`.

pub mod chat;
pub mod notification;
pub mod task;
pub mod user;
