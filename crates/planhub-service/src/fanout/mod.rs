//! Notification fan-out: who hears about a task event, and the in-process
//! queue that delivers it.

pub mod engine;
pub mod relevance;
pub mod worker;

pub use engine::{FanoutEngine, FanoutJob};
pub use relevance::{InterestedParty, chat_recipients, classify_relevance, interested_parties};
pub use worker::FanoutWorker;
