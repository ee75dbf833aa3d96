//! Agent records and their bounded transition history

use super::energy::clamp_unit;
use super::overrides::{Override, TransitionPlan};
use super::state::LifecycleState;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Unique identifier for a lifecycle-managed agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId::new(s)
    }
}

/// One committed transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: LifecycleState,
    pub requested: LifecycleState,
    pub to: LifecycleState,
    pub energy_before: f64,
    pub energy_after: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<Override>,
    /// Milliseconds since epoch
    pub timestamp: u64,
}

/// Lifecycle state of a single agent (Entity)
///
/// Energy and fracture are kept inside [0, 1] by every mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub agent_type: String,
    pub state: LifecycleState,
    energy: f64,
    fracture: f64,
    /// Milliseconds since epoch of the last committed transition (or registration)
    pub last_transition_at: u64,
    history: VecDeque<TransitionRecord>,
    history_limit: usize,
}

impl AgentRecord {
    pub fn new(
        id: AgentId,
        agent_type: impl Into<String>,
        initial_energy: f64,
        history_limit: usize,
        now: u64,
    ) -> Self {
        Self {
            id,
            agent_type: agent_type.into(),
            state: LifecycleState::Init,
            energy: clamp_unit(initial_energy),
            fracture: 0.0,
            last_transition_at: now,
            history: VecDeque::new(),
            history_limit,
        }
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn fracture(&self) -> f64 {
        self.fracture
    }

    pub fn history(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.history.iter()
    }

    pub fn last_transition(&self) -> Option<&TransitionRecord> {
        self.history.back()
    }

    pub fn set_fracture(&mut self, value: f64) {
        self.fracture = clamp_unit(value);
    }

    /// Commit a resolved plan; the plan must originate from this record's state
    pub fn apply(&mut self, plan: &TransitionPlan, now: u64) -> TransitionRecord {
        debug_assert_eq!(plan.from, self.state);

        let record = TransitionRecord {
            from: self.state,
            requested: plan.requested,
            to: plan.final_state,
            energy_before: self.energy,
            energy_after: clamp_unit(plan.energy),
            overrides: plan.overrides.clone(),
            timestamp: now,
        };

        self.state = plan.final_state;
        self.energy = record.energy_after;
        self.last_transition_at = now;

        if self.history_limit > 0 {
            while self.history.len() >= self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(record.clone());
        }

        record
    }

    /// Milliseconds spent in the current state as of `now`
    pub fn time_in_state(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_transition_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::overrides::plan_transition;
    use crate::lifecycle::profile::LifecycleProfile;

    fn record(limit: usize) -> AgentRecord {
        AgentRecord::new(AgentId::new("a-1"), "worker", 1.0, limit, 1_000)
    }

    #[test]
    fn test_new_record_starts_in_init() {
        let r = record(4);
        assert_eq!(r.state, LifecycleState::Init);
        assert_eq!(r.energy(), 1.0);
        assert_eq!(r.fracture(), 0.0);
        assert!(r.last_transition().is_none());
    }

    #[test]
    fn test_apply_updates_state_and_history() {
        let mut r = record(4);
        let plan = plan_transition(
            r.state,
            LifecycleState::Orient,
            r.energy(),
            r.fracture(),
            &LifecycleProfile::default(),
        )
        .unwrap();
        let rec = r.apply(&plan, 2_000);

        assert_eq!(r.state, LifecycleState::Orient);
        assert_eq!(rec.energy_before, 1.0);
        assert_eq!(r.last_transition_at, 2_000);
        assert_eq!(r.time_in_state(2_500), 500);
        assert_eq!(r.last_transition(), Some(&rec));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut r = record(2);
        let profile = LifecycleProfile::default();
        for target in [
            LifecycleState::Orient,
            LifecycleState::Rest,
            LifecycleState::Orient,
        ] {
            let plan = plan_transition(r.state, target, r.energy(), r.fracture(), &profile).unwrap();
            r.apply(&plan, 0);
        }
        let kept: Vec<_> = r.history().map(|t| t.to).collect();
        assert_eq!(kept, vec![LifecycleState::Rest, LifecycleState::Orient]);
    }

    #[test]
    fn test_fracture_is_clamped() {
        let mut r = record(1);
        r.set_fracture(3.0);
        assert_eq!(r.fracture(), 1.0);
        r.set_fracture(-1.0);
        assert_eq!(r.fracture(), 0.0);
    }
}
