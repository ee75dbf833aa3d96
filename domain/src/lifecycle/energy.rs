//! Energy model: per-state cost table and recovery clamp
//!
//! | State | Cost |
//! |-------|------|
//! | Init | 0.10 |
//! | Orient | 0.15 |
//! | Act | 0.30 |
//! | Echo | 0.10 |
//! | Consolidate | 0.20 |
//! | Rest | -0.30 (recovery) |
//! | Drift | 0.25 |
//! | Crisis | 0.50 |

use super::state::LifecycleState;
use serde::{Deserialize, Serialize};

/// Default recovery granted by entering Rest
pub const DEFAULT_RECOVERY_RATE: f64 = 0.3;

/// Stateless cost lookup, parameterized only by the Rest recovery magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyModel {
    recovery_rate: f64,
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self {
            recovery_rate: DEFAULT_RECOVERY_RATE,
        }
    }
}

impl EnergyModel {
    pub fn with_recovery_rate(recovery_rate: f64) -> Self {
        Self {
            recovery_rate: recovery_rate.clamp(0.0, 1.0),
        }
    }

    pub fn recovery_rate(&self) -> f64 {
        self.recovery_rate
    }

    /// Cost of entering `state`. Negative means recovery.
    pub fn cost(&self, state: LifecycleState) -> f64 {
        match state {
            LifecycleState::Init => 0.1,
            LifecycleState::Orient => 0.15,
            LifecycleState::Act => 0.3,
            LifecycleState::Echo => 0.1,
            LifecycleState::Consolidate => 0.2,
            LifecycleState::Rest => -self.recovery_rate,
            LifecycleState::Drift => 0.25,
            LifecycleState::Crisis => 0.5,
        }
    }

    /// Whether `energy` covers the cost of entering `state` without going negative
    pub fn can_afford(&self, energy: f64, state: LifecycleState) -> bool {
        energy - self.cost(state) >= 0.0
    }

    /// Energy after entering `state`, clamped to [0, 1]
    pub fn apply(&self, energy: f64, state: LifecycleState) -> f64 {
        clamp_unit(energy - self.cost(state))
    }
}

/// Clamp to the unit interval; NaN collapses to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
