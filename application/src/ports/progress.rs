//! Progress notification port
//!
//! Defines the interface for reporting progress during a consultation.

use agora_domain::{RoleId, SessionPhase};

/// Callback for progress updates during a consultation
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console bars, plain text, ...).
pub trait ConsultationProgress: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, phase: &SessionPhase, total_tasks: usize);

    /// Called when a role finishes its task within a phase
    fn on_task_complete(&self, phase: &SessionPhase, role: &RoleId, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: &SessionPhase);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ConsultationProgress for NoProgress {
    fn on_phase_start(&self, _phase: &SessionPhase, _total_tasks: usize) {}
    fn on_task_complete(&self, _phase: &SessionPhase, _role: &RoleId, _success: bool) {}
    fn on_phase_complete(&self, _phase: &SessionPhase) {}
}
