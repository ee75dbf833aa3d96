//! Wake-signal predicate port
//!
//! Lets an external system report that something relevant is waiting for a
//! particular agent (a message, a scheduled job, ...).

use agora_domain::AgentId;

pub trait WakeSignalSource: Send + Sync {
    /// True when a signal relevant to `agent_id` is pending
    fn has_pending_signal(&self, agent_id: &AgentId) -> bool;
}

/// Source that never reports a signal
pub struct NoWakeSignals;

impl WakeSignalSource for NoWakeSignals {
    fn has_pending_signal(&self, _agent_id: &AgentId) -> bool {
        false
    }
}
