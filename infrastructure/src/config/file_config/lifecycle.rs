//! Lifecycle configuration from TOML (`[lifecycle]` and `[collective]`)
//!
//! Example configuration:
//!
//! ```toml
//! [lifecycle]
//! low_energy_threshold = 0.2
//! fracture_threshold = 0.7
//! recovery_rate = 0.3
//! history_limit = 64
//!
//! [lifecycle.max_state_secs]
//! crisis = 120
//!
//! [lifecycle.types.scout]
//! recovery_rate = 0.5
//! initial_energy = 0.8
//!
//! [collective]
//! min_awake = 3
//! ```

use super::ConfigError;
use agora_application::{CollectiveConfig, LifecycleConfig};
use agora_domain::{LifecycleProfile, LifecycleState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default lifecycle profile plus per-agent-type overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLifecycleConfig {
    pub low_energy_threshold: f64,
    pub fracture_threshold: f64,
    pub recovery_rate: f64,
    pub initial_energy: f64,
    pub history_limit: usize,
    /// State name -> maximum seconds an agent should stay in it
    pub max_state_secs: BTreeMap<String, u64>,
    /// Agent type -> fields overriding the defaults above
    pub types: BTreeMap<String, FileLifecycleOverride>,
}

impl Default for FileLifecycleConfig {
    fn default() -> Self {
        let profile = LifecycleProfile::default();
        Self {
            low_energy_threshold: profile.low_energy_threshold,
            fracture_threshold: profile.fracture_threshold,
            recovery_rate: profile.recovery_rate,
            initial_energy: profile.initial_energy,
            history_limit: profile.history_limit,
            max_state_secs: BTreeMap::new(),
            types: BTreeMap::new(),
        }
    }
}

/// Per-type overrides; unset fields inherit from `[lifecycle]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLifecycleOverride {
    pub low_energy_threshold: Option<f64>,
    pub fracture_threshold: Option<f64>,
    pub recovery_rate: Option<f64>,
    pub initial_energy: Option<f64>,
    pub history_limit: Option<usize>,
    pub max_state_secs: BTreeMap<String, u64>,
}

impl FileLifecycleConfig {
    /// Build the frozen lifecycle configuration.
    ///
    /// Thresholds are clamped into [0, 1]; unknown state names and zero
    /// durations are rejected.
    pub fn to_lifecycle_config(&self) -> Result<LifecycleConfig, ConfigError> {
        let base = with_durations(
            LifecycleProfile::default()
                .with_low_energy_threshold(self.low_energy_threshold)
                .with_fracture_threshold(self.fracture_threshold)
                .with_recovery_rate(self.recovery_rate)
                .with_initial_energy(self.initial_energy)
                .with_history_limit(self.history_limit),
            &self.max_state_secs,
        )?;

        let mut config = LifecycleConfig::new(base.clone());
        for (agent_type, overrides) in &self.types {
            config = config.with_type(agent_type.clone(), overrides.apply(base.clone())?);
        }
        Ok(config)
    }
}

impl FileLifecycleOverride {
    fn apply(&self, mut profile: LifecycleProfile) -> Result<LifecycleProfile, ConfigError> {
        if let Some(v) = self.low_energy_threshold {
            profile = profile.with_low_energy_threshold(v);
        }
        if let Some(v) = self.fracture_threshold {
            profile = profile.with_fracture_threshold(v);
        }
        if let Some(v) = self.recovery_rate {
            profile = profile.with_recovery_rate(v);
        }
        if let Some(v) = self.initial_energy {
            profile = profile.with_initial_energy(v);
        }
        if let Some(v) = self.history_limit {
            profile = profile.with_history_limit(v);
        }
        with_durations(profile, &self.max_state_secs)
    }
}

fn with_durations(
    mut profile: LifecycleProfile,
    max_state_secs: &BTreeMap<String, u64>,
) -> Result<LifecycleProfile, ConfigError> {
    for (name, secs) in max_state_secs {
        let state: LifecycleState = name
            .parse()
            .map_err(|_| ConfigError::UnknownState(name.clone()))?;
        if *secs == 0 {
            return Err(ConfigError::InvalidDuration(format!("lifecycle.max_state_secs.{}", name)));
        }
        profile = profile.with_max_duration(state, Duration::from_secs(*secs));
    }
    Ok(profile)
}

/// Collective coordinator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCollectiveConfig {
    /// Minimum number of awake agents before everyone is woken
    pub min_awake: usize,
}

impl Default for FileCollectiveConfig {
    fn default() -> Self {
        Self {
            min_awake: CollectiveConfig::default().min_awake,
        }
    }
}

impl FileCollectiveConfig {
    pub fn to_collective_config(&self) -> CollectiveConfig {
        CollectiveConfig::default().with_min_awake(self.min_awake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain_profile() {
        let config = FileLifecycleConfig::default().to_lifecycle_config().unwrap();
        assert_eq!(config.default_profile, LifecycleProfile::default());
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_type_override_inherits_defaults() {
        let toml_str = r#"
low_energy_threshold = 0.25
history_limit = 10

[max_state_secs]
crisis = 120

[types.scout]
recovery_rate = 0.5
"#;
        let file: FileLifecycleConfig = toml::from_str(toml_str).unwrap();
        let config = file.to_lifecycle_config().unwrap();

        let scout = config.profile_for("scout");
        assert_eq!(scout.recovery_rate, 0.5);
        assert_eq!(scout.low_energy_threshold, 0.25);
        assert_eq!(scout.history_limit, 10);
        assert_eq!(
            scout.max_duration(LifecycleState::Crisis),
            Some(Duration::from_secs(120))
        );
        assert_eq!(config.profile_for("other").recovery_rate, 0.3);
    }

    #[test]
    fn test_thresholds_are_clamped() {
        let file = FileLifecycleConfig {
            fracture_threshold: 1.5,
            low_energy_threshold: -0.2,
            ..Default::default()
        };
        let profile = file.to_lifecycle_config().unwrap().default_profile;
        assert_eq!(profile.fracture_threshold, 1.0);
        assert_eq!(profile.low_energy_threshold, 0.0);
    }

    #[test]
    fn test_unknown_state_and_zero_duration_rejected() {
        let mut file = FileLifecycleConfig::default();
        file.max_state_secs.insert("napping".into(), 10);
        assert!(matches!(
            file.to_lifecycle_config(),
            Err(ConfigError::UnknownState(s)) if s == "napping"
        ));

        let mut file = FileLifecycleConfig::default();
        file.max_state_secs.insert("rest".into(), 0);
        assert!(matches!(
            file.to_lifecycle_config(),
            Err(ConfigError::InvalidDuration(_))
        ));
    }
}
