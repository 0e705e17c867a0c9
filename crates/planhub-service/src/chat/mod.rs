//! Task chat: access-checked message creation and listing.

pub mod service;

pub use service::ChatService;
