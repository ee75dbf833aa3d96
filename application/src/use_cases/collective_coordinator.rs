//! Collective coordinator
//!
//! Keeps an eventually-consistent, read-mostly view of every agent's state
//! and energy, decides wake conditions and fans committed changes out to the
//! event bus and the event journal.
//!
//! The snapshot is an `Arc<HashMap<..>>` swapped on every broadcast: readers
//! clone the `Arc` and release the lock before touching the map.

use crate::config::CollectiveConfig;
use crate::ports::event_bus::{EventBus, NoEventBus};
use crate::ports::event_journal::{EventJournal, NoEventJournal};
use crate::ports::wake_signal::{NoWakeSignals, WakeSignalSource};
use agora_domain::{AgentId, CoreEvent, LifecycleState};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

/// Last broadcast view of one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub state: LifecycleState,
    pub energy: f64,
    /// Milliseconds since epoch of the committed change
    pub timestamp: u64,
}

pub type CollectiveSnapshot = Arc<HashMap<AgentId, AgentSnapshot>>;

pub struct CollectiveCoordinator {
    config: CollectiveConfig,
    snapshot: RwLock<CollectiveSnapshot>,
    bus: Arc<dyn EventBus>,
    journal: Arc<dyn EventJournal>,
    wake_signals: Arc<dyn WakeSignalSource>,
}

impl CollectiveCoordinator {
    pub fn new(config: CollectiveConfig) -> Self {
        Self {
            config,
            snapshot: RwLock::new(Arc::new(HashMap::new())),
            bus: Arc::new(NoEventBus::new()),
            journal: Arc::new(NoEventJournal),
            wake_signals: Arc::new(NoWakeSignals),
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_journal(mut self, journal: Arc<dyn EventJournal>) -> Self {
        self.journal = journal;
        self
    }

    pub fn with_wake_signals(mut self, source: Arc<dyn WakeSignalSource>) -> Self {
        self.wake_signals = source;
        self
    }

    /// Record a committed state change and publish `event`.
    ///
    /// Never blocks on subscribers.
    pub fn broadcast(
        &self,
        agent_id: &AgentId,
        state: LifecycleState,
        energy: f64,
        timestamp: u64,
        event: CoreEvent,
    ) {
        self.observe(
            agent_id,
            AgentSnapshot {
                state,
                energy,
                timestamp,
            },
        );
        self.journal.append(&event);
        self.bus.publish(event.topic(), event);
    }

    /// Update the snapshot without publishing anything (e.g. on registration).
    ///
    /// Updates older than the current entry are ignored.
    pub fn observe(&self, agent_id: &AgentId, update: AgentSnapshot) {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        let stale = guard
            .get(agent_id)
            .is_some_and(|current| current.timestamp > update.timestamp);
        if stale {
            return;
        }
        let mut next = HashMap::clone(&guard);
        next.insert(agent_id.clone(), update);
        *guard = Arc::new(next);
    }

    /// Current view of all agents
    pub fn snapshot(&self) -> CollectiveSnapshot {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of agents not resting
    pub fn awake_count(&self) -> usize {
        self.snapshot()
            .values()
            .filter(|s| s.state.is_awake())
            .count()
    }

    /// True if too few agents are awake, or a signal is pending for `agent_id`
    pub fn should_wake(&self, agent_id: &AgentId) -> bool {
        let awake = self.awake_count();
        if awake < self.config.min_awake {
            debug!(
                "Wake {}: {} awake, minimum {}",
                agent_id, awake, self.config.min_awake
            );
            return true;
        }
        let signalled = self.wake_signals.has_pending_signal(agent_id);
        if signalled {
            debug!("Wake {}: pending signal", agent_id);
        }
        signalled
    }

    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<CoreEvent> {
        self.bus.subscribe(topic)
    }
}
