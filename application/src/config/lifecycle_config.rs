//! Lifecycle and collective configuration.

use agora_domain::LifecycleProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle profiles, resolved per agent type.
///
/// Types without an explicit profile fall back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    pub default_profile: LifecycleProfile,
    pub types: BTreeMap<String, LifecycleProfile>,
}

impl LifecycleConfig {
    pub fn new(default_profile: LifecycleProfile) -> Self {
        Self {
            default_profile,
            types: BTreeMap::new(),
        }
    }

    pub fn with_type(mut self, agent_type: impl Into<String>, profile: LifecycleProfile) -> Self {
        self.types.insert(agent_type.into(), profile);
        self
    }

    pub fn profile_for(&self, agent_type: &str) -> &LifecycleProfile {
        self.types.get(agent_type).unwrap_or(&self.default_profile)
    }
}

/// Wake policy of the collective coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectiveConfig {
    /// Below this many awake (non-Rest) agents, every agent should wake
    pub min_awake: usize,
}

impl Default for CollectiveConfig {
    fn default() -> Self {
        Self { min_awake: 3 }
    }
}

impl CollectiveConfig {
    pub fn with_min_awake(mut self, min_awake: usize) -> Self {
        self.min_awake = min_awake;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_for_falls_back_to_default() {
        let scout = LifecycleProfile::default().with_recovery_rate(0.5);
        let config = LifecycleConfig::default().with_type("scout", scout.clone());

        assert_eq!(config.profile_for("scout"), &scout);
        assert_eq!(config.profile_for("worker"), &LifecycleProfile::default());
    }

    #[test]
    fn test_collective_default() {
        assert_eq!(CollectiveConfig::default().min_awake, 3);
    }
}
