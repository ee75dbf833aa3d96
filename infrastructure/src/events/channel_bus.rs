//! In-process event bus on tokio broadcast channels.
//!
//! One channel per topic, created lazily on first publish or subscribe.
//! Slow subscribers lag (and are told so by the receiver) instead of
//! blocking publishers.

use agora_application::EventBus;
use agora_domain::CoreEvent;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of buffered events per topic
pub const DEFAULT_CAPACITY: usize = 256;

pub struct ChannelEventBus {
    capacity: usize,
    topics: Mutex<HashMap<String, broadcast::Sender<CoreEvent>>>,
}

impl ChannelEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<CoreEvent> {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for ChannelEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for ChannelEventBus {
    fn publish(&self, topic: &str, event: CoreEvent) {
        // Err only means nobody is listening
        if let Ok(receivers) = self.sender(topic).send(event) {
            trace!("Published on {} to {} subscriber(s)", topic, receivers);
        }
    }

    fn subscribe(&self, topic: &str) -> broadcast::Receiver<CoreEvent> {
        self.sender(topic).subscribe()
    }
}
