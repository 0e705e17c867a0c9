//! Notification fan-out queue configuration.

use serde::{Deserialize, Serialize};

/// Settings for the in-process notification fan-out queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Bounded capacity of the delivery queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Maximum number of deliveries processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Attempts per recipient before a delivery is abandoned.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff between attempts in milliseconds (multiplied by the attempt number).
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_concurrency() -> usize {
    8
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    200
}
