//! Consultation configuration from TOML (`[consultation]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [consultation]
//! rounds = 3
//! role_timeout_secs = 60
//! session_budget_secs = 300
//! moderator = "gpt-4.1"
//! max_roles = 5
//! roles = ["architect", "security", "pragmatist"]
//! ```

use super::ConfigError;
use agora_application::ConsultationParams;
use agora_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsultationConfig {
    /// Critique/refine rounds after dispatch (0 allowed)
    pub rounds: usize,
    /// Timeout for each single role invocation
    pub role_timeout_secs: u64,
    /// Wall-clock budget of a whole consultation
    pub session_budget_secs: u64,
    /// Model writing the synthesis narrative
    pub moderator: Option<String>,
    /// Upper bound for automatic role selection
    pub max_roles: usize,
    /// Built-in role ids to consult; empty selects automatically
    pub roles: Vec<String>,
}

impl Default for FileConsultationConfig {
    fn default() -> Self {
        let params = ConsultationParams::default();
        Self {
            rounds: params.rounds,
            role_timeout_secs: params.role_timeout.as_secs(),
            session_budget_secs: params.session_budget.as_secs(),
            moderator: None,
            max_roles: params.max_roles,
            roles: Vec::new(),
        }
    }
}

impl FileConsultationConfig {
    /// Parse moderator into a Model, ignoring blank names
    pub fn parse_moderator(&self) -> Option<Model> {
        self.moderator
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Model::new)
    }

    pub fn to_params(&self) -> Result<ConsultationParams, ConfigError> {
        if self.role_timeout_secs == 0 {
            return Err(ConfigError::InvalidDuration(
                "consultation.role_timeout_secs".to_string(),
            ));
        }
        if self.session_budget_secs == 0 {
            return Err(ConfigError::InvalidDuration(
                "consultation.session_budget_secs".to_string(),
            ));
        }
        if self.max_roles == 0 {
            return Err(ConfigError::InvalidValue(
                "consultation.max_roles must be at least 1".to_string(),
            ));
        }

        let mut params = ConsultationParams::default()
            .with_rounds(self.rounds)
            .with_role_timeout(Duration::from_secs(self.role_timeout_secs))
            .with_session_budget(Duration::from_secs(self.session_budget_secs))
            .with_max_roles(self.max_roles);
        if let Some(moderator) = self.parse_moderator() {
            params = params.with_moderator(moderator);
        }
        Ok(params)
    }
}
