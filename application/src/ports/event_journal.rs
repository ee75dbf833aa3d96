//! Port for durable event persistence.
//!
//! Defines the [`EventJournal`] trait for appending core events (committed
//! transitions, consultation outcomes) to an append-only store.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while the journal captures every terminal
//! state change in a machine-readable form (e.g. JSONL).

use agora_domain::CoreEvent;

/// Port for appending events to a durable store.
///
/// `append` is synchronous and non-fallible so persistence problems never
/// disturb a transition or a consultation; implementations swallow and
/// log their own failures. It is called while a per-agent lock is held,
/// so implementations hand I/O off instead of performing it inline.
pub trait EventJournal: Send + Sync {
    /// Record an event.
    fn append(&self, event: &CoreEvent);
}

/// No-op implementation for tests and when persistence is disabled.
pub struct NoEventJournal;

impl EventJournal for NoEventJournal {
    fn append(&self, _event: &CoreEvent) {}
}
