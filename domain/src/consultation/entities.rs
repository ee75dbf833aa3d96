//! Consultation session entity

use super::consensus::ConsensusBuckets;
use super::parsing::extract_positions;
use super::report::{
    ConsultationReport, DegradedReason, ReportStatus, RoleAttribution, summarize_buckets,
};
use super::value_objects::{RoleOutput, RoleResult, SynthesisRound};
use crate::core::query::Query;
use crate::role::entities::{RoleAgent, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Unique identifier for a consultation session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase of a consultation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "round")]
pub enum SessionPhase {
    Dispatch,
    CollectResponses,
    /// Critique/refine round (1-indexed)
    SynthesisRound(usize),
    Consensus,
    Compile,
    Compiled,
    SessionFailed,
}

impl SessionPhase {
    pub fn display_name(&self) -> String {
        match self {
            SessionPhase::Dispatch => "Dispatch".to_string(),
            SessionPhase::CollectResponses => "Collect Responses".to_string(),
            SessionPhase::SynthesisRound(n) => format!("Synthesis Round {}", n),
            SessionPhase::Consensus => "Consensus".to_string(),
            SessionPhase::Compile => "Compile".to_string(),
            SessionPhase::Compiled => "Compiled".to_string(),
            SessionPhase::SessionFailed => "Session Failed".to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Compiled | SessionPhase::SessionFailed)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One run of the consultation protocol (Entity)
///
/// Role results are keyed by role id. A result leaves `Pending` at most
/// once; later attempts to overwrite it are ignored.
#[derive(Debug, Clone)]
pub struct ConsultationSession {
    id: SessionId,
    query: Query,
    roles: BTreeMap<RoleId, Arc<RoleAgent>>,
    results: BTreeMap<RoleId, RoleResult>,
    /// Latest position per successful role, advanced by each round
    positions: BTreeMap<RoleId, RoleOutput>,
    rounds: Vec<SynthesisRound>,
    phase: SessionPhase,
}

impl ConsultationSession {
    pub fn new(id: SessionId, query: Query, roles: &[Arc<RoleAgent>]) -> Self {
        let roles: BTreeMap<RoleId, Arc<RoleAgent>> = roles
            .iter()
            .map(|r| (r.id.clone(), Arc::clone(r)))
            .collect();
        let results = roles
            .keys()
            .map(|id| (id.clone(), RoleResult::pending(id.clone())))
            .collect();
        Self {
            id,
            query,
            roles,
            results,
            positions: BTreeMap::new(),
            rounds: Vec::new(),
            phase: SessionPhase::Dispatch,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    /// Number of the last completed synthesis round
    pub fn round(&self) -> usize {
        self.rounds.len()
    }

    pub fn roles(&self) -> impl Iterator<Item = &Arc<RoleAgent>> {
        self.roles.values()
    }

    pub fn results(&self) -> impl Iterator<Item = &RoleResult> {
        self.results.values()
    }

    /// Finalize a pending result. Returns false if the role is unknown or
    /// its result was already finalized.
    pub fn record_result(&mut self, result: RoleResult) -> bool {
        let Some(slot) = self.results.get_mut(&result.role) else {
            return false;
        };
        if slot.status.is_terminal() || !result.status.is_terminal() {
            return false;
        }
        if result.is_success() {
            self.positions.insert(
                result.role.clone(),
                RoleOutput::new(result.content.clone(), result.confidence),
            );
        }
        *slot = result;
        true
    }

    /// Roles whose dispatch succeeded, in id order
    pub fn successful_roles(&self) -> Vec<Arc<RoleAgent>> {
        self.results
            .values()
            .filter(|r| r.is_success())
            .filter_map(|r| self.roles.get(&r.role).cloned())
            .collect()
    }

    pub fn has_success(&self) -> bool {
        self.results.values().any(|r| r.is_success())
    }

    pub fn all_finalized(&self) -> bool {
        self.results.values().all(|r| r.status.is_terminal())
    }

    /// Latest position of every successful role, as (role, content)
    pub fn positions(&self) -> Vec<(RoleId, String)> {
        self.positions
            .iter()
            .map(|(id, out)| (id.clone(), out.content.clone()))
            .collect()
    }

    /// Store a completed round and advance the refined positions
    pub fn record_round(&mut self, round: SynthesisRound) {
        for contribution in &round.contributions {
            if let Some(refined) = &contribution.refined
                && self.positions.contains_key(&contribution.role)
            {
                self.positions
                    .insert(contribution.role.clone(), refined.clone());
            }
        }
        self.rounds.push(round);
    }

    /// Partition the current positions of successful roles
    pub fn consensus(&self) -> ConsensusBuckets {
        let positions: Vec<_> = self
            .positions
            .iter()
            .map(|(id, out)| (id.clone(), extract_positions(&out.content)))
            .collect();
        ConsensusBuckets::build(&positions)
    }

    /// Ids of roles that did not succeed, for "pending review" annotations
    pub fn excluded_roles(&self) -> Vec<String> {
        self.results
            .values()
            .filter(|r| !r.is_success())
            .map(|r| r.role.to_string())
            .collect()
    }

    /// Compile into an immutable report, consuming the session
    pub fn compile(
        self,
        consensus: ConsensusBuckets,
        narrative: Option<(String, String)>,
        degraded: Option<DegradedReason>,
    ) -> ConsultationReport {
        let (narrative, moderator) = match narrative {
            Some((moderator, text)) => (text, Some(moderator)),
            None => (summarize_buckets(&consensus, &self.excluded_roles()), None),
        };

        let attributions = self
            .results
            .into_values()
            .map(|result| {
                let title = self
                    .roles
                    .get(&result.role)
                    .map(|r| r.title.clone())
                    .unwrap_or_default();
                let final_position = self.positions.get(&result.role).map(|p| p.content.clone());
                let annotation = match result.status {
                    super::value_objects::RoleStatus::Success => None,
                    super::value_objects::RoleStatus::Pending => {
                        Some("pending review (no response before compile)".to_string())
                    }
                    _ => Some(format!(
                        "pending review ({})",
                        result.error.as_deref().unwrap_or(result.status.as_str())
                    )),
                };
                RoleAttribution {
                    title,
                    result,
                    final_position,
                    annotation,
                }
            })
            .collect();

        ConsultationReport {
            session_id: self.id,
            query: self.query.content().to_string(),
            status: if degraded.is_some() {
                ReportStatus::Degraded
            } else {
                ReportStatus::Complete
            },
            degraded_reason: degraded,
            rounds_completed: self.rounds.len(),
            attributions,
            rounds: self.rounds,
            consensus,
            narrative,
            moderator,
        }
    }
}
