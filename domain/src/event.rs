//! Events emitted on every terminal state change
//!
//! Published on the event bus and appended to the event journal. Serialized
//! with a `type` tag so journal lines are self-describing.

use crate::consultation::entities::SessionId;
use crate::consultation::report::{ConsultationReport, DegradedReason, ReportStatus};
use crate::consultation::value_objects::RoleStatus;
use crate::lifecycle::overrides::Override;
use crate::lifecycle::record::{AgentId, TransitionRecord};
use crate::lifecycle::state::LifecycleState;
use serde::{Deserialize, Serialize};

/// Event bus topic for committed lifecycle transitions
pub const TOPIC_LIFECYCLE: &str = "lifecycle.transition";
/// Event bus topic for consultation completion and failure
pub const TOPIC_CONSULTATION: &str = "consultation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreEvent {
    TransitionCommitted {
        agent_id: AgentId,
        agent_type: String,
        from: LifecycleState,
        requested: LifecycleState,
        to: LifecycleState,
        energy: f64,
        fracture: f64,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        overrides: Vec<Override>,
        timestamp: u64,
    },
    ConsultationCompleted {
        session_id: SessionId,
        status: ReportStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        degraded_reason: Option<DegradedReason>,
        succeeded: usize,
        failed: usize,
        rounds: usize,
    },
    ConsultationFailed {
        session_id: SessionId,
        reason: String,
    },
}

impl CoreEvent {
    pub fn transition(
        agent_id: AgentId,
        agent_type: impl Into<String>,
        record: &TransitionRecord,
        fracture: f64,
    ) -> Self {
        CoreEvent::TransitionCommitted {
            agent_id,
            agent_type: agent_type.into(),
            from: record.from,
            requested: record.requested,
            to: record.to,
            energy: record.energy_after,
            fracture,
            overrides: record.overrides.clone(),
            timestamp: record.timestamp,
        }
    }

    pub fn completed(report: &ConsultationReport) -> Self {
        let succeeded = report.count(RoleStatus::Success);
        CoreEvent::ConsultationCompleted {
            session_id: report.session_id.clone(),
            status: report.status,
            degraded_reason: report.degraded_reason,
            succeeded,
            failed: report.attributions.len() - succeeded,
            rounds: report.rounds_completed,
        }
    }

    /// Event type tag, matching the serialized `type` field
    pub fn event_type(&self) -> &'static str {
        match self {
            CoreEvent::TransitionCommitted { .. } => "transition_committed",
            CoreEvent::ConsultationCompleted { .. } => "consultation_completed",
            CoreEvent::ConsultationFailed { .. } => "consultation_failed",
        }
    }

    pub fn topic(&self) -> &'static str {
        match self {
            CoreEvent::TransitionCommitted { .. } => TOPIC_LIFECYCLE,
            _ => TOPIC_CONSULTATION,
        }
    }
}
