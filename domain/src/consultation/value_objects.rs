//! Consultation value objects - per-role outcomes and round contributions.
//!
//! - [`RoleResult`] - outcome of dispatching one role (finalized once)
//! - [`RoleFailure`] - why a role produced nothing
//! - [`RoundContribution`] - one role's critique and refinement in a round
//! - [`SynthesisRound`] - all contributions of one round

use crate::role::entities::RoleId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status of a dispatched role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleStatus {
    /// Dispatched, no outcome yet
    Pending,
    Success,
    Timeout,
    Error,
}

impl RoleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleStatus::Pending => "pending",
            RoleStatus::Success => "success",
            RoleStatus::Timeout => "timeout",
            RoleStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RoleStatus::Pending)
    }
}

impl std::fmt::Display for RoleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a role invocation produced no content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum RoleFailure {
    Timeout(Duration),
    Error(String),
}

impl std::fmt::Display for RoleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleFailure::Timeout(after) => write!(f, "timed out after {:.1}s", after.as_secs_f64()),
            RoleFailure::Error(msg) => write!(f, "{}", msg),
        }
    }
}

/// Content and self-reported confidence returned by a role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleOutput {
    pub content: String,
    pub confidence: f64,
}

impl RoleOutput {
    pub fn new(content: impl Into<String>, confidence: f64) -> Self {
        Self {
            content: content.into(),
            confidence: crate::lifecycle::energy::clamp_unit(confidence),
        }
    }
}

/// Outcome of dispatching a single role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleResult {
    pub role: RoleId,
    pub status: RoleStatus,
    pub content: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoleResult {
    /// A freshly dispatched role with no outcome yet
    pub fn pending(role: RoleId) -> Self {
        Self {
            role,
            status: RoleStatus::Pending,
            content: String::new(),
            confidence: 0.0,
            error: None,
        }
    }

    pub fn success(role: RoleId, output: RoleOutput) -> Self {
        Self {
            role,
            status: RoleStatus::Success,
            content: output.content,
            confidence: output.confidence,
            error: None,
        }
    }

    pub fn failure(role: RoleId, failure: &RoleFailure) -> Self {
        let status = match failure {
            RoleFailure::Timeout(_) => RoleStatus::Timeout,
            RoleFailure::Error(_) => RoleStatus::Error,
        };
        Self {
            role,
            status,
            content: String::new(),
            confidence: 0.0,
            error: Some(failure.to_string()),
        }
    }

    pub fn from_outcome(role: RoleId, outcome: Result<RoleOutput, RoleFailure>) -> Self {
        match outcome {
            Ok(output) => Self::success(role, output),
            Err(failure) => Self::failure(role, &failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RoleStatus::Success
    }
}

/// One role's work within a synthesis round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundContribution {
    pub role: RoleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique: Option<String>,
    /// Refined position; `None` when the round failed for this role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined: Option<RoleOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<RoleFailure>,
}

impl RoundContribution {
    pub fn refined(role: RoleId, critique: String, refined: RoleOutput) -> Self {
        Self {
            role,
            critique: Some(critique),
            refined: Some(refined),
            failure: None,
        }
    }

    pub fn failed(role: RoleId, critique: Option<String>, failure: RoleFailure) -> Self {
        Self {
            role,
            critique,
            refined: None,
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.refined.is_some()
    }
}

/// All contributions of one critique/refine round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRound {
    /// Round number (1-indexed)
    pub round: usize,
    pub contributions: Vec<RoundContribution>,
}
