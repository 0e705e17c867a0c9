//! Core type definitions used across the PlanHub workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
