//! Per-agent-type lifecycle thresholds
//!
//! Loaded once at construction time and never mutated afterwards.

use super::energy::{DEFAULT_RECOVERY_RATE, EnergyModel, clamp_unit};
use super::state::LifecycleState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Thresholds governing one agent type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleProfile {
    /// Below this energy a non-Rest commit is forced into Rest
    pub low_energy_threshold: f64,
    /// Above this fracture a non-Drift commit is forced into Drift
    pub fracture_threshold: f64,
    /// Energy restored by entering Rest
    pub recovery_rate: f64,
    /// Energy assigned to newly registered agents
    pub initial_energy: f64,
    /// Maximum number of retained transition records
    pub history_limit: usize,
    /// Longest an agent should stay in a state before a scheduler intervenes
    pub max_state_durations: BTreeMap<LifecycleState, Duration>,
}

impl Default for LifecycleProfile {
    fn default() -> Self {
        Self {
            low_energy_threshold: 0.2,
            fracture_threshold: 0.7,
            recovery_rate: DEFAULT_RECOVERY_RATE,
            initial_energy: 1.0,
            history_limit: 64,
            max_state_durations: BTreeMap::new(),
        }
    }
}

impl LifecycleProfile {
    pub fn with_low_energy_threshold(mut self, value: f64) -> Self {
        self.low_energy_threshold = clamp_unit(value);
        self
    }

    pub fn with_fracture_threshold(mut self, value: f64) -> Self {
        self.fracture_threshold = clamp_unit(value);
        self
    }

    pub fn with_recovery_rate(mut self, value: f64) -> Self {
        self.recovery_rate = clamp_unit(value);
        self
    }

    pub fn with_initial_energy(mut self, value: f64) -> Self {
        self.initial_energy = clamp_unit(value);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_max_duration(mut self, state: LifecycleState, max: Duration) -> Self {
        self.max_state_durations.insert(state, max);
        self
    }

    pub fn energy_model(&self) -> EnergyModel {
        EnergyModel::with_recovery_rate(self.recovery_rate)
    }

    pub fn max_duration(&self, state: LifecycleState) -> Option<Duration> {
        self.max_state_durations.get(&state).copied()
    }
}
