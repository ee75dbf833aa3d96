//! Consultation domain
//!
//! A consultation fans a query out to several roles, lets the successful
//! ones critique and refine their positions over a number of rounds, and
//! compiles what they agree on.
//!
//! ```text
//! Dispatch ─► CollectResponses ─► SynthesisRound(1..N) ─► Consensus ─► Compile
//!                   │                                                    │
//!                   └── no role succeeded ─► SessionFailed        Compiled
//! ```

pub mod consensus;
pub mod entities;
pub mod parsing;
pub mod report;
pub mod value_objects;

pub use consensus::{ConsensusBuckets, ConsensusItem, ConsensusKind};
pub use entities::{ConsultationSession, SessionId, SessionPhase};
pub use parsing::{Position, extract_positions, parse_confidence};
pub use report::{ConsultationReport, DegradedReason, ReportStatus, RoleAttribution};
pub use value_objects::{
    RoleFailure, RoleOutput, RoleResult, RoleStatus, RoundContribution, SynthesisRound,
};
