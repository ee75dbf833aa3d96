//! Consultation parameters - orchestrator loop control.
//!
//! [`ConsultationParams`] groups the static parameters that control one
//! run of [`ConsultationOrchestrator`](crate::use_cases::run_consultation::ConsultationOrchestrator).

use agora_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Consultation control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationParams {
    /// Number of critique/refine rounds after dispatch (0 skips synthesis)
    pub rounds: usize,
    /// Independent bound on every single role invocation
    pub role_timeout: Duration,
    /// Wall-clock budget of the whole session; exceeding it forces compile
    pub session_budget: Duration,
    /// Model producing the synthesis narrative; `None` uses the built-in summary
    pub moderator: Option<Model>,
    /// Upper bound for automatic role selection
    pub max_roles: usize,
}

impl Default for ConsultationParams {
    fn default() -> Self {
        Self {
            rounds: 3,
            role_timeout: Duration::from_secs(60),
            session_budget: Duration::from_secs(300),
            moderator: None,
            max_roles: 5,
        }
    }
}

impl ConsultationParams {
    // ==================== Builder Methods ====================

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_role_timeout(mut self, timeout: Duration) -> Self {
        self.role_timeout = timeout;
        self
    }

    pub fn with_session_budget(mut self, budget: Duration) -> Self {
        self.session_budget = budget;
        self
    }

    pub fn with_moderator(mut self, model: Model) -> Self {
        self.moderator = Some(model);
        self
    }

    pub fn with_max_roles(mut self, max: usize) -> Self {
        self.max_roles = max;
        self
    }
}
