//! Top-level real-time engine that ties together the WebSocket subsystems.

use std::sync::Arc;

use tracing::info;

use planhub_core::config::RealtimeConfig;

use crate::channel::registry::ChannelRegistry;
use crate::connection::manager::ConnectionManager;
use crate::publisher::RealtimePublisher;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Channel registry.
    pub channels: Arc<ChannelRegistry>,
}

impl RealtimeEngine {
    /// Creates a new real-time engine.
    pub fn new(config: RealtimeConfig) -> Self {
        let channels = Arc::new(ChannelRegistry::new());
        let connections = Arc::new(ConnectionManager::new(config, channels.clone()));

        info!("Real-time engine initialized");
        Self {
            connections,
            channels,
        }
    }

    /// A push channel that delivers through this engine.
    pub fn publisher(&self) -> Arc<RealtimePublisher> {
        Arc::new(RealtimePublisher::new(self.connections.clone()))
    }

    /// Closes every connection.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.connections.close_all();
    }
}
