//! Pub/sub channels: `user:{id}` channels and `task:{id}:chat` rooms.

pub mod registry;
pub mod types;

pub use registry::ChannelRegistry;
pub use types::ChannelType;
