//! Task and project entities as consumed by the chat and notification core.

pub mod context;
pub mod model;

pub use context::{TaskChatContext, TaskParticipant, TaskRelation};
pub use model::{Project, Task};
