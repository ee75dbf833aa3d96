//! Transition planning with resource-gated redirects and corrective overrides
//!
//! ```text
//! requested ──legal?──► redirect (InsufficientEnergy) ──► commit
//!                                                           │
//!                         one corrective pass: LowEnergy ► FractureDrift
//! ```
//!
//! The corrective pass runs exactly once and never re-evaluates its own
//! result. Energy is always derived from the pre-transition energy and the
//! cost of the finally committed state.

use super::energy::clamp_unit;
use super::profile::LifecycleProfile;
use super::state::LifecycleState;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Override applied while resolving a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Override {
    /// Requested state was unaffordable; redirected to Rest before commit
    InsufficientEnergy,
    /// Post-commit energy fell below the low threshold; forced Rest
    LowEnergy,
    /// Fracture exceeded its threshold; forced Drift
    FractureDrift,
}

impl Override {
    pub fn as_str(&self) -> &'static str {
        match self {
            Override::InsufficientEnergy => "insufficient_energy",
            Override::LowEnergy => "low_energy",
            Override::FractureDrift => "fracture_drift",
        }
    }

    pub fn target(&self) -> LifecycleState {
        match self {
            Override::InsufficientEnergy | Override::LowEnergy => LifecycleState::Rest,
            Override::FractureDrift => LifecycleState::Drift,
        }
    }
}

impl std::fmt::Display for Override {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fully resolved outcome of a transition request, not yet committed
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub from: LifecycleState,
    pub requested: LifecycleState,
    pub final_state: LifecycleState,
    pub energy: f64,
    pub overrides: Vec<Override>,
}

/// Resolve a transition request against the current state, energy and fracture.
///
/// Fails only when `requested` is not a legal edge from `from`.
pub fn plan_transition(
    from: LifecycleState,
    requested: LifecycleState,
    energy: f64,
    fracture: f64,
    profile: &LifecycleProfile,
) -> Result<TransitionPlan, DomainError> {
    if !from.can_transition_to(requested) {
        return Err(DomainError::InvalidTransition {
            from,
            to: requested,
        });
    }

    let model = profile.energy_model();
    let energy = clamp_unit(energy);
    let mut overrides = Vec::new();

    let mut committed = requested;
    if requested != LifecycleState::Rest && !model.can_afford(energy, requested) {
        overrides.push(Override::InsufficientEnergy);
        committed = LifecycleState::Rest;
    }

    let committed_energy = model.apply(energy, committed);

    let corrective = if committed_energy < profile.low_energy_threshold
        && committed != LifecycleState::Rest
    {
        Some(Override::LowEnergy)
    } else if clamp_unit(fracture) > profile.fracture_threshold
        && committed != LifecycleState::Drift
    {
        Some(Override::FractureDrift)
    } else {
        None
    };

    let (final_state, final_energy) = match corrective {
        Some(ov) => {
            overrides.push(ov);
            (ov.target(), model.apply(energy, ov.target()))
        }
        None => (committed, committed_energy),
    };

    Ok(TransitionPlan {
        from,
        requested,
        final_state,
        energy: final_energy,
        overrides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleState::*;

    fn plan(from: LifecycleState, to: LifecycleState, energy: f64, fracture: f64) -> TransitionPlan {
        plan_transition(from, to, energy, fracture, &LifecycleProfile::default()).unwrap()
    }

    #[test]
    fn test_every_illegal_edge_is_rejected() {
        let profile = LifecycleProfile::default();
        for from in LifecycleState::ALL {
            for to in LifecycleState::ALL {
                let result = plan_transition(from, to, 1.0, 0.0, &profile);
                if from.can_transition_to(to) {
                    assert!(result.is_ok(), "{from} -> {to} should be legal");
                } else {
                    assert_eq!(
                        result.unwrap_err(),
                        DomainError::InvalidTransition { from, to }
                    );
                }
            }
        }
    }

    #[test]
    fn test_plain_transition() {
        let p = plan(Init, Orient, 1.0, 0.0);
        assert_eq!(p.final_state, Orient);
        assert!(p.overrides.is_empty());
        assert!((p.energy - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_fracture_forces_drift() {
        let p = plan(Act, Echo, 1.0, 0.8);
        assert_eq!(p.final_state, Drift);
        assert_eq!(p.overrides, vec![Override::FractureDrift]);
        assert!((p.energy - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_low_energy_rest_recovers() {
        // 0.15 exactly covers Orient, leaving 0.0 < 0.2 so the corrective pass fires
        let p = plan(Rest, Orient, 0.15, 0.0);
        assert_eq!(p.final_state, Rest);
        assert_eq!(p.overrides, vec![Override::LowEnergy]);
        assert!(p.energy > 0.15);
    }

    #[test]
    fn test_unaffordable_redirects_to_rest() {
        let p = plan(Orient, Act, 0.1, 0.0);
        assert_eq!(p.final_state, Rest);
        assert_eq!(p.overrides, vec![Override::InsufficientEnergy]);
        assert!((p.energy - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_energy_takes_precedence_over_fracture() {
        let p = plan(Orient, Act, 0.35, 0.95);
        assert_eq!(p.final_state, Rest);
        assert_eq!(p.overrides, vec![Override::LowEnergy]);
    }

    #[test]
    fn test_redirect_then_fracture_pass_runs_once() {
        // Redirected to Rest, then fracture forces Drift; no further pass
        let p = plan(Orient, Act, 0.1, 0.9);
        assert_eq!(p.overrides, vec![Override::InsufficientEnergy, Override::FractureDrift]);
        assert_eq!(p.final_state, Drift);
        assert_eq!(p.energy, 0.0);
    }

    #[test]
    fn test_drift_request_with_high_fracture_is_not_overridden() {
        let p = plan(Orient, Drift, 1.0, 0.9);
        assert_eq!(p.final_state, Drift);
        assert!(p.overrides.is_empty());
    }

    #[test]
    fn test_energy_stays_in_unit_interval() {
        for from in LifecycleState::ALL {
            for &to in from.legal_targets() {
                for energy in [0.0, 0.05, 0.2, 0.5, 0.95, 1.0] {
                    for fracture in [0.0, 0.7, 1.0] {
                        let p = plan(from, to, energy, fracture);
                        assert!((0.0..=1.0).contains(&p.energy));
                    }
                }
            }
        }
    }
}
