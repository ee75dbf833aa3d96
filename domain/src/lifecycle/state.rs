//! Lifecycle states and the static transition graph

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// State of an agent's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Freshly started, nothing perceived yet
    Init,
    /// Gathering bearings before acting
    Orient,
    /// Doing work
    Act,
    /// Reflecting on the effects of an action
    Echo,
    /// Integrating what was learned
    Consolidate,
    /// Recovering energy
    Rest,
    /// Unstructured exploration
    Drift,
    /// Emergency handling
    Crisis,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 8] = [
        LifecycleState::Init,
        LifecycleState::Orient,
        LifecycleState::Act,
        LifecycleState::Echo,
        LifecycleState::Consolidate,
        LifecycleState::Rest,
        LifecycleState::Drift,
        LifecycleState::Crisis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Init => "init",
            LifecycleState::Orient => "orient",
            LifecycleState::Act => "act",
            LifecycleState::Echo => "echo",
            LifecycleState::Consolidate => "consolidate",
            LifecycleState::Rest => "rest",
            LifecycleState::Drift => "drift",
            LifecycleState::Crisis => "crisis",
        }
    }

    /// States reachable from this one without an override
    pub fn legal_targets(&self) -> &'static [LifecycleState] {
        use LifecycleState::*;
        match self {
            Init => &[Orient, Rest],
            Orient => &[Act, Drift, Rest],
            Act => &[Echo, Consolidate, Rest],
            Echo => &[Consolidate, Orient, Rest],
            Consolidate => &[Rest, Orient, Drift],
            Rest => &[Init, Orient, Consolidate],
            Drift => &[Orient, Rest],
            Crisis => &[Act, Rest],
        }
    }

    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        self.legal_targets().contains(&target)
    }

    /// An agent counts as awake in every state except Rest
    pub fn is_awake(&self) -> bool {
        !matches!(self, LifecycleState::Rest)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LifecycleState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_edges_match_table() {
        use LifecycleState::*;
        assert!(Init.can_transition_to(Orient));
        assert!(Crisis.can_transition_to(Act));
        assert!(Rest.can_transition_to(Consolidate));
        assert!(!Init.can_transition_to(Act));
        assert!(!Rest.can_transition_to(Rest));
        assert!(!Drift.can_transition_to(Crisis));
    }

    #[test]
    fn test_no_state_reaches_crisis_or_itself() {
        for from in LifecycleState::ALL {
            assert!(!from.can_transition_to(LifecycleState::Crisis));
            assert!(!from.can_transition_to(from));
        }
    }

    #[test]
    fn test_parse_roundtrip() {
        for state in LifecycleState::ALL {
            assert_eq!(state.as_str().parse::<LifecycleState>().unwrap(), state);
        }
        assert_eq!("ORIENT".parse::<LifecycleState>().unwrap(), LifecycleState::Orient);
        assert!("sleep".parse::<LifecycleState>().is_err());
    }

    #[test]
    fn test_only_rest_is_asleep() {
        assert!(!LifecycleState::Rest.is_awake());
        assert!(LifecycleState::Drift.is_awake());
    }
}
