//! Process lifecycle: shutdown coordination and signal wiring.
//!
//! The gateway runs until externally terminated; Ctrl+C is the only
//! shutdown trigger in normal operation. Tests trigger the coordinator
//! directly.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Trigger `shutdown` once Ctrl+C is received.
pub async fn shutdown_on_ctrl_c(shutdown: Shutdown) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Ctrl+C received");
    shutdown.trigger();
}
