//! Event bus port
//!
//! Publish/subscribe abstraction for core events, decoupled from any
//! transport. Publishing must never block the caller.

use agora_domain::CoreEvent;
use tokio::sync::broadcast;

/// Pub/sub channel for [`CoreEvent`]s, keyed by topic
pub trait EventBus: Send + Sync {
    /// Publish an event; fire-and-forget. Events published with no
    /// subscriber are dropped.
    fn publish(&self, topic: &str, event: CoreEvent);

    /// Receive every event published on `topic` from now on
    fn subscribe(&self, topic: &str) -> broadcast::Receiver<CoreEvent>;
}

/// Bus that discards everything; subscribers never receive events
pub struct NoEventBus {
    closed: broadcast::Sender<CoreEvent>,
}

impl NoEventBus {
    pub fn new() -> Self {
        let (closed, _) = broadcast::channel(1);
        Self { closed }
    }
}

impl Default for NoEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for NoEventBus {
    fn publish(&self, _topic: &str, _event: CoreEvent) {}

    fn subscribe(&self, _topic: &str) -> broadcast::Receiver<CoreEvent> {
        self.closed.subscribe()
    }
}
