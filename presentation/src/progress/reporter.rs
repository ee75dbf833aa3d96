//! Progress reporting for consultations

use agora_application::ConsultationProgress;
use agora_domain::{RoleId, SessionPhase};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// Reports progress during a consultation with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_label(phase: &SessionPhase) -> String {
        match phase {
            SessionPhase::Dispatch => "Phase 1: Dispatch".to_string(),
            SessionPhase::SynthesisRound(n) => format!("Phase 2: Round {}", n),
            SessionPhase::Consensus => "Phase 3: Consensus".to_string(),
            SessionPhase::Compile => "Phase 4: Compile".to_string(),
            other => other.display_name(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsultationProgress for ProgressReporter {
    fn on_phase_start(&self, phase: &SessionPhase, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(Self::phase_label(phase));
        pb.set_message("Starting...");

        *self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_task_complete(&self, _phase: &SessionPhase, role: &RoleId, success: bool) {
        if let Some(pb) = self
            .phase_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), role)
            } else {
                format!("{} {}", "x".red(), role)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: &SessionPhase) {
        if let Some(pb) = self
            .phase_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            // Consensus and compile have no per-role tasks
            if matches!(phase, SessionPhase::Consensus | SessionPhase::Compile) {
                pb.inc(1);
            }
            pb.finish_with_message(format!("{}", "done".green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ConsultationProgress for SimpleProgress {
    fn on_phase_start(&self, phase: &SessionPhase, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            ProgressReporter::phase_label(phase).bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _phase: &SessionPhase, role: &RoleId, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), role);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), role);
        }
    }

    fn on_phase_complete(&self, _phase: &SessionPhase) {}
}
