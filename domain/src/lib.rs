//! Domain layer for agora
//!
//! This crate contains the core rules, entities and value objects.
//! It has no dependencies on async runtimes, infrastructure or presentation.
//!
//! # Core Concepts
//!
//! ## Lifecycle
//!
//! Each agent runs a fixed eight-state machine. Entering a state costs
//! energy, Rest restores it, and two thresholds (low energy, high fracture)
//! can override the requested target in a single bounded corrective pass.
//!
//! ## Consultation
//!
//! A query is put to several specialist roles at once. Successful roles
//! critique each other and refine their positions over a few rounds, and the
//! final positions are bucketed by level of agreement:
//!
//! - **Unanimous**: every participating role holds the stance
//! - **Majority**: more than half hold it; the rest are named **dissent**
//! - **Open**: no stance reaches a majority

pub mod consultation;
pub mod core;
pub mod event;
pub mod lifecycle;
pub mod prompt;
pub mod role;

// Re-export commonly used types
pub use consultation::{
    ConsensusBuckets, ConsensusItem, ConsensusKind, ConsultationReport, ConsultationSession,
    DegradedReason, Position, ReportStatus, RoleAttribution, RoleFailure, RoleOutput, RoleResult,
    RoleStatus, RoundContribution, SessionId, SessionPhase, SynthesisRound, extract_positions,
    parse_confidence,
};
pub use core::{error::DomainError, model::Model, query::Query};
pub use event::CoreEvent;
pub use lifecycle::{
    AgentId, AgentRecord, EnergyModel, LifecycleProfile, LifecycleState, Override,
    TransitionPlan, TransitionRecord, plan_transition,
};
pub use prompt::PromptTemplate;
pub use role::{RoleAgent, RoleId, RoleRegistry};
