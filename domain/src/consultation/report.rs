//! Compiled consultation report

use super::consensus::ConsensusBuckets;
use super::entities::SessionId;
use super::value_objects::{RoleResult, RoleStatus, SynthesisRound};
use serde::{Deserialize, Serialize};

/// Overall status of a compiled report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Every configured round ran to completion
    Complete,
    /// Compiled early; see [`DegradedReason`]
    Degraded,
}

/// Why a report was compiled early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    /// The session wall-clock budget ran out
    SessionTimeout,
    /// The caller cancelled the session
    Cancelled,
}

impl std::fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradedReason::SessionTimeout => write!(f, "session time budget exceeded"),
            DegradedReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-role entry of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAttribution {
    pub title: String,
    pub result: RoleResult,
    /// Latest position after synthesis rounds (successful roles only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_position: Option<String>,
    /// Annotation for roles that did not contribute, e.g. "pending review"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

/// Complete, immutable result of a consultation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationReport {
    pub session_id: SessionId,
    pub query: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<DegradedReason>,
    pub rounds_completed: usize,
    pub attributions: Vec<RoleAttribution>,
    pub rounds: Vec<SynthesisRound>,
    pub consensus: ConsensusBuckets,
    pub narrative: String,
    /// Model that wrote the narrative; `None` for the built-in summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderator: Option<String>,
}

impl ConsultationReport {
    pub fn is_degraded(&self) -> bool {
        self.status == ReportStatus::Degraded
    }

    pub fn results(&self) -> impl Iterator<Item = &RoleResult> {
        self.attributions.iter().map(|a| &a.result)
    }

    pub fn successful(&self) -> impl Iterator<Item = &RoleResult> {
        self.results().filter(|r| r.is_success())
    }

    pub fn count(&self, status: RoleStatus) -> usize {
        self.results().filter(|r| r.status == status).count()
    }
}

/// Plain-text narrative built from consensus buckets alone.
///
/// Used when no moderator is configured or the moderator call fails.
pub fn summarize_buckets(buckets: &ConsensusBuckets, excluded: &[String]) -> String {
    let mut out = String::new();

    if buckets.participants == 0 {
        out.push_str("No role produced a position.");
    } else {
        out.push_str(&format!(
            "{} role(s) contributed positions.",
            buckets.participants
        ));
    }

    let sections = [
        ("Agreed by all", &buckets.unanimous),
        ("Agreed by majority", &buckets.majority),
        ("Minority alternatives", &buckets.dissent),
        ("Unresolved", &buckets.open),
    ];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("\n\n{}:", heading));
        for item in items {
            let who: Vec<&str> = item.supporters.iter().map(|r| r.as_str()).collect();
            if crate::core::string::normalize(&item.topic)
                == crate::core::string::normalize(&item.stance)
            {
                out.push_str(&format!("\n- {} ({})", item.stance, who.join(", ")));
            } else {
                out.push_str(&format!(
                    "\n- {}: {} ({})",
                    item.topic,
                    item.stance,
                    who.join(", ")
                ));
            }
        }
    }

    if !excluded.is_empty() {
        out.push_str(&format!("\n\nPending review: {}", excluded.join(", ")));
    }

    out
}
