//! Lifecycle controller
//!
//! Owns one [`AgentRecord`] per registered agent and executes transition
//! requests against it. The registry is append-only; each record sits behind
//! its own lock, so transitions of one agent are totally ordered while
//! different agents proceed independently.
//!
//! Every committed transition is reported to the [`CollectiveCoordinator`]
//! before the agent lock is released, which keeps the published order equal
//! to the commit order.

use super::collective_coordinator::{AgentSnapshot, CollectiveCoordinator};
use crate::config::LifecycleConfig;
use agora_domain::core::time::current_timestamp;
use agora_domain::{
    AgentId, AgentRecord, CoreEvent, DomainError, LifecycleState, Override, plan_transition,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Errors returned by lifecycle operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("Invalid transition: {from} -> {to} is not a legal edge")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for TransitionError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidTransition { from, to } => {
                TransitionError::InvalidTransition { from, to }
            }
            other => TransitionError::Domain(other),
        }
    }
}

/// Result of a committed transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub final_state: LifecycleState,
    /// Overrides in the order they were applied (empty if none)
    pub overrides: Vec<Override>,
    pub energy: f64,
}

type AgentSlot = Arc<Mutex<AgentRecord>>;

pub struct LifecycleController {
    config: LifecycleConfig,
    agents: RwLock<HashMap<AgentId, AgentSlot>>,
    coordinator: Arc<CollectiveCoordinator>,
}

impl LifecycleController {
    pub fn new(config: LifecycleConfig, coordinator: Arc<CollectiveCoordinator>) -> Self {
        Self {
            config,
            agents: RwLock::new(HashMap::new()),
            coordinator,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Arc<CollectiveCoordinator> {
        &self.coordinator
    }

    /// Register an agent in `Init` with its type's initial energy.
    ///
    /// Registering an existing id leaves it untouched and returns its
    /// current record.
    pub fn register(&self, agent_id: AgentId, agent_type: &str) -> AgentRecord {
        let mut agents = self.agents.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = agents.get(&agent_id) {
            return lock(slot).clone();
        }

        let profile = self.config.profile_for(agent_type);
        let now = current_timestamp();
        let record = AgentRecord::new(
            agent_id.clone(),
            agent_type,
            profile.initial_energy,
            profile.history_limit,
            now,
        );
        self.coordinator.observe(
            &agent_id,
            AgentSnapshot {
                state: record.state,
                energy: record.energy(),
                timestamp: now,
            },
        );
        info!("Registered agent {} ({})", agent_id, agent_type);
        agents.insert(agent_id, Arc::new(Mutex::new(record.clone())));
        record
    }

    /// Move an agent toward `requested`, applying energy and fracture overrides.
    ///
    /// Fails only for unknown agents and illegal edges; an unaffordable
    /// target is redirected to Rest and reported as an override.
    pub fn transition(
        &self,
        agent_id: &AgentId,
        requested: LifecycleState,
    ) -> Result<TransitionOutcome, TransitionError> {
        let slot = self.slot(agent_id)?;
        let mut agent = lock(&slot);

        let profile = self.config.profile_for(&agent.agent_type);
        let plan = plan_transition(
            agent.state,
            requested,
            agent.energy(),
            agent.fracture(),
            profile,
        )?;

        let record = agent.apply(&plan, current_timestamp());
        if record.overrides.is_empty() {
            debug!(
                "Agent {}: {} -> {} (energy {:.2})",
                agent_id, record.from, record.to, record.energy_after
            );
        } else {
            info!(
                "Agent {}: {} -> {} overridden to {} by [{}] (energy {:.2})",
                agent_id,
                record.from,
                record.requested,
                record.to,
                record
                    .overrides
                    .iter()
                    .map(|o| o.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                record.energy_after
            );
        }

        let event = CoreEvent::transition(
            agent_id.clone(),
            agent.agent_type.clone(),
            &record,
            agent.fracture(),
        );
        self.coordinator.broadcast(
            agent_id,
            record.to,
            record.energy_after,
            record.timestamp,
            event,
        );

        Ok(TransitionOutcome {
            final_state: record.to,
            overrides: record.overrides,
            energy: record.energy_after,
        })
    }

    /// Snapshot of an agent's record
    pub fn get_state(&self, agent_id: &AgentId) -> Result<AgentRecord, TransitionError> {
        let slot = self.slot(agent_id)?;
        let record = lock(&slot).clone();
        Ok(record)
    }

    /// Whether the agent is currently outside Rest
    pub fn is_awake(&self, agent_id: &AgentId) -> Result<bool, TransitionError> {
        let slot = self.slot(agent_id)?;
        let awake = lock(&slot).state.is_awake();
        Ok(awake)
    }

    /// Ids of all registered agents, sorted
    pub fn agents(&self) -> Vec<AgentId> {
        let agents = self.agents.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<AgentId> = agents.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Set the fracture index (clamped to [0, 1]); returns the stored value
    pub fn set_fracture(&self, agent_id: &AgentId, value: f64) -> Result<f64, TransitionError> {
        let slot = self.slot(agent_id)?;
        let mut agent = lock(&slot);
        agent.set_fracture(value);
        Ok(agent.fracture())
    }

    /// Add `delta` to the fracture index (clamped); returns the stored value
    pub fn adjust_fracture(&self, agent_id: &AgentId, delta: f64) -> Result<f64, TransitionError> {
        let slot = self.slot(agent_id)?;
        let mut agent = lock(&slot);
        let next = agent.fracture() + delta;
        agent.set_fracture(next);
        Ok(agent.fracture())
    }

    /// Agents that have stayed in their current state longer than their
    /// type's configured maximum, as of `now` (ms since epoch)
    pub fn overdue_agents(&self, now: u64) -> Vec<(AgentId, LifecycleState)> {
        let slots: Vec<(AgentId, AgentSlot)> = {
            let agents = self.agents.read().unwrap_or_else(PoisonError::into_inner);
            agents
                .iter()
                .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
                .collect()
        };

        let mut overdue: Vec<(AgentId, LifecycleState)> = slots
            .into_iter()
            .filter_map(|(id, slot)| {
                let agent = lock(&slot);
                let max = self
                    .config
                    .profile_for(&agent.agent_type)
                    .max_duration(agent.state)?;
                (u128::from(agent.time_in_state(now)) > max.as_millis())
                    .then_some((id, agent.state))
            })
            .collect();
        overdue.sort();
        overdue
    }

    fn slot(&self, agent_id: &AgentId) -> Result<AgentSlot, TransitionError> {
        let agents = self.agents.read().unwrap_or_else(PoisonError::into_inner);
        agents
            .get(agent_id)
            .cloned()
            .ok_or_else(|| TransitionError::UnknownAgent(agent_id.clone()))
    }
}

fn lock(slot: &AgentSlot) -> std::sync::MutexGuard<'_, AgentRecord> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
