//! Run Consultation use case
//!
//! Orchestrates the full consultation flow:
//!
//! 1. **Dispatch / CollectResponses**: every role is invoked concurrently,
//!    each bounded by its own timeout
//! 2. **SynthesisRound(1..N)**: successful roles critique their peers, then
//!    refine their own position; a round ends only when every active role
//!    has finished it
//! 3. **Consensus**: final positions are bucketed
//! 4. **Compile**: the immutable report, with an optional moderator narrative
//!
//! Cancellation and the session budget are checked while waiting on any
//! phase; either one stops the phase, aborts in-flight calls and compiles a
//! degraded report from what has completed so far.

use crate::config::ConsultationParams;
use crate::ports::event_bus::{EventBus, NoEventBus};
use crate::ports::event_journal::{EventJournal, NoEventJournal};
use crate::ports::llm_gateway::{GatewayError, InvocationRequest, LlmGateway};
use crate::ports::progress::{ConsultationProgress, NoProgress};
use crate::use_cases::lifecycle_controller::{LifecycleController, TransitionError};
use agora_domain::consultation::report::summarize_buckets;
use agora_domain::core::time::current_timestamp;
use agora_domain::{
    AgentId, ConsensusBuckets, ConsultationReport, ConsultationSession, CoreEvent,
    DegradedReason, Model, PromptTemplate, Query, RoleAgent, RoleFailure, RoleId, RoleOutput,
    RoleResult, RoleStatus, RoundContribution, SessionId, SessionPhase, SynthesisRound,
    parse_confidence,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during a consultation
#[derive(Error, Debug)]
pub enum ConsultationError {
    #[error("No roles selected for the consultation")]
    NoRoles,

    #[error("Consultation {session_id} failed: {reason}")]
    SessionFailed {
        session_id: SessionId,
        reason: String,
    },

    #[error("Requesting agent {0} is resting")]
    RequesterResting(AgentId),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] TransitionError),
}

/// Input for the consultation use case
#[derive(Debug, Clone)]
pub struct ConsultInput {
    pub query: Query,
    pub roles: Vec<Arc<RoleAgent>>,
    pub params: ConsultationParams,
    /// Agent asking for the consultation; refused while it rests
    pub requester: Option<AgentId>,
    /// Explicit session id; generated when absent
    pub session_id: Option<SessionId>,
}

impl ConsultInput {
    pub fn new(query: Query, roles: Vec<Arc<RoleAgent>>) -> Self {
        Self {
            query,
            roles,
            params: ConsultationParams::default(),
            requester: None,
            session_id: None,
        }
    }

    pub fn with_params(mut self, params: ConsultationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_requester(mut self, agent_id: AgentId) -> Self {
        self.requester = Some(agent_id);
        self
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

/// Why a phase stopped before all of its tasks finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Cancelled,
    BudgetExhausted,
}

impl Interrupt {
    fn reason(self) -> DegradedReason {
        match self {
            Interrupt::Cancelled => DegradedReason::Cancelled,
            Interrupt::BudgetExhausted => DegradedReason::SessionTimeout,
        }
    }
}

type ActiveSessions = Mutex<HashMap<SessionId, CancellationToken>>;

/// Removes a session's cancellation token once the consultation ends,
/// including when the consult future is dropped.
struct ActiveSession<'a> {
    sessions: &'a ActiveSessions,
    id: SessionId,
}

impl Drop for ActiveSession<'_> {
    fn drop(&mut self) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

fn next_session_id() -> SessionId {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    SessionId::new(format!("cs-{}-{}", current_timestamp(), seq))
}

/// Use case for running consultations
pub struct ConsultationOrchestrator<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    lifecycle: Option<Arc<LifecycleController>>,
    bus: Arc<dyn EventBus>,
    journal: Arc<dyn EventJournal>,
    active: ActiveSessions,
}

impl<G: LlmGateway + 'static> ConsultationOrchestrator<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            lifecycle: None,
            bus: Arc::new(NoEventBus::new()),
            journal: Arc::new(NoEventJournal),
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Gate consultations on the requester being awake
    pub fn with_lifecycle(mut self, lifecycle: Arc<LifecycleController>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_journal(mut self, journal: Arc<dyn EventJournal>) -> Self {
        self.journal = journal;
        self
    }

    /// Run a consultation with default (no-op) progress
    pub async fn consult(
        &self,
        input: ConsultInput,
    ) -> Result<ConsultationReport, ConsultationError> {
        self.consult_with_progress(input, &NoProgress).await
    }

    /// Run a consultation with progress callbacks
    pub async fn consult_with_progress(
        &self,
        input: ConsultInput,
        progress: &dyn ConsultationProgress,
    ) -> Result<ConsultationReport, ConsultationError> {
        if input.roles.is_empty() {
            return Err(ConsultationError::NoRoles);
        }
        if let Some(requester) = &input.requester {
            self.check_requester(requester)?;
        }

        let session_id = input.session_id.clone().unwrap_or_else(next_session_id);
        let token = CancellationToken::new();
        let _active = self.track(&session_id, token.clone());
        let deadline = session_deadline(input.params.session_budget);

        info!(
            "Starting consultation {} with {} roles, {} round(s)",
            session_id,
            input.roles.len(),
            input.params.rounds
        );

        let mut session =
            ConsultationSession::new(session_id.clone(), input.query.clone(), &input.roles);

        // Phase 1: Dispatch and collect
        let interrupt = self
            .phase_dispatch(&mut session, &input.params, &token, deadline, progress)
            .await;

        if !session.has_success() {
            match interrupt {
                Some(Interrupt::Cancelled) => {}
                Some(Interrupt::BudgetExhausted) => {
                    return Err(
                        self.fail(&mut session, "session budget exhausted before any role responded")
                    );
                }
                None => return Err(self.fail(&mut session, "all roles failed")),
            }
        }

        // Phase 2: Synthesis rounds
        let interrupt = match interrupt {
            Some(interrupt) => Some(interrupt),
            None => {
                self.phase_synthesis(&mut session, &input.params, &token, deadline, progress)
                    .await
            }
        };
        let degraded = interrupt.map(Interrupt::reason);

        // Phase 3: Consensus
        session.set_phase(SessionPhase::Consensus);
        progress.on_phase_start(&SessionPhase::Consensus, 1);
        let consensus = session.consensus();
        debug!(
            "Consensus: {} unanimous, {} majority, {} dissent, {} open",
            consensus.unanimous.len(),
            consensus.majority.len(),
            consensus.dissent.len(),
            consensus.open.len()
        );
        progress.on_phase_complete(&SessionPhase::Consensus);

        // Phase 4: Compile
        session.set_phase(SessionPhase::Compile);
        progress.on_phase_start(&SessionPhase::Compile, 1);
        let (narrative, degraded) = match (&input.params.moderator, degraded) {
            (Some(moderator), None) => match self
                .moderate(&session, &consensus, moderator, &input.params, &token, deadline)
                .await
            {
                Ok(narrative) => (narrative, None),
                Err(interrupt) => {
                    warn!("Moderator interrupted ({:?}); using built-in summary", interrupt);
                    (None, Some(interrupt.reason()))
                }
            },
            (_, degraded) => (None, degraded),
        };
        let report = session.compile(consensus, narrative, degraded);
        progress.on_phase_complete(&SessionPhase::Compile);

        match report.degraded_reason {
            Some(reason) => warn!(
                "Consultation {} compiled degraded ({}) after {} round(s)",
                report.session_id, reason, report.rounds_completed
            ),
            None => info!(
                "Consultation {} compiled: {} of {} roles succeeded",
                report.session_id,
                report.count(RoleStatus::Success),
                report.attributions.len()
            ),
        }

        self.emit(CoreEvent::completed(&report));
        Ok(report)
    }

    /// Request cancellation of a running consultation.
    ///
    /// Returns false if no consultation with that id is running.
    pub fn cancel_consultation(&self, session_id: &SessionId) -> bool {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match active.get(session_id) {
            Some(token) => {
                info!("Cancelling consultation {}", session_id);
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Ids of consultations currently running
    pub fn active_sessions(&self) -> Vec<SessionId> {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<SessionId> = active.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn track(&self, session_id: &SessionId, token: CancellationToken) -> ActiveSession<'_> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.clone(), token);
        ActiveSession {
            sessions: &self.active,
            id: session_id.clone(),
        }
    }

    fn check_requester(&self, requester: &AgentId) -> Result<(), ConsultationError> {
        let Some(lifecycle) = &self.lifecycle else {
            debug!("No lifecycle controller; requester {} is not gated", requester);
            return Ok(());
        };
        if lifecycle.is_awake(requester)? {
            Ok(())
        } else {
            Err(ConsultationError::RequesterResting(requester.clone()))
        }
    }

    fn fail(&self, session: &mut ConsultationSession, reason: &str) -> ConsultationError {
        session.set_phase(SessionPhase::SessionFailed);
        warn!("Consultation {} failed: {}", session.id(), reason);
        self.emit(CoreEvent::ConsultationFailed {
            session_id: session.id().clone(),
            reason: reason.to_string(),
        });
        ConsultationError::SessionFailed {
            session_id: session.id().clone(),
            reason: reason.to_string(),
        }
    }

    fn emit(&self, event: CoreEvent) {
        self.journal.append(&event);
        self.bus.publish(event.topic(), event);
    }

    /// Phase 1: Invoke every role in parallel and record the outcomes
    async fn phase_dispatch(
        &self,
        session: &mut ConsultationSession,
        params: &ConsultationParams,
        token: &CancellationToken,
        deadline: Instant,
        progress: &dyn ConsultationProgress,
    ) -> Option<Interrupt> {
        let roles: Vec<Arc<RoleAgent>> = session.roles().cloned().collect();
        info!("Phase 1: Dispatch to {} roles", roles.len());
        session.set_phase(SessionPhase::Dispatch);
        progress.on_phase_start(&SessionPhase::Dispatch, roles.len());

        let prompt = PromptTemplate::dispatch_prompt(session.query().content());
        let mut join_set = JoinSet::new();

        for role in roles {
            let gateway = Arc::clone(&self.gateway);
            let request = InvocationRequest::new(
                role.model.clone(),
                role.system_prompt.clone(),
                prompt.clone(),
                params.role_timeout,
            );

            join_set.spawn(async move {
                let outcome = Self::invoke_bounded(gateway.as_ref(), request)
                    .await
                    .map(|content| {
                        let confidence = parse_confidence(&content);
                        RoleOutput::new(content, confidence)
                    });
                (role.id.clone(), outcome)
            });
        }

        session.set_phase(SessionPhase::CollectResponses);
        let interrupt = collect_until_interrupted(&mut join_set, token, deadline, |(role, outcome)| {
            match &outcome {
                Ok(output) => info!(
                    "Role {} responded (confidence {:.2})",
                    role, output.confidence
                ),
                Err(failure) => warn!("Role {} failed: {}", role, failure),
            }
            progress.on_task_complete(&SessionPhase::Dispatch, &role, outcome.is_ok());
            session.record_result(RoleResult::from_outcome(role, outcome));
        })
        .await;

        if interrupt.is_none() {
            // A task that panicked never reported back
            let lost: Vec<RoleId> = session
                .results()
                .filter(|r| r.status == RoleStatus::Pending)
                .map(|r| r.role.clone())
                .collect();
            for role in lost {
                warn!("Role {} task ended without a result", role);
                session.record_result(RoleResult::failure(
                    role,
                    &RoleFailure::Error("role task aborted".to_string()),
                ));
            }
        }

        progress.on_phase_complete(&SessionPhase::Dispatch);
        interrupt
    }

    /// Phase 2: Critique/refine rounds among the successful roles
    ///
    /// A role whose critique or refinement fails keeps its last good
    /// position and sits out the remaining rounds.
    async fn phase_synthesis(
        &self,
        session: &mut ConsultationSession,
        params: &ConsultationParams,
        token: &CancellationToken,
        deadline: Instant,
        progress: &dyn ConsultationProgress,
    ) -> Option<Interrupt> {
        let mut active = session.successful_roles();

        for round in 1..=params.rounds {
            if token.is_cancelled() {
                return Some(Interrupt::Cancelled);
            }
            if Instant::now() >= deadline {
                return Some(Interrupt::BudgetExhausted);
            }
            if active.len() < 2 {
                debug!(
                    "Fewer than two active roles; ending synthesis after {} round(s)",
                    round - 1
                );
                break;
            }

            let phase = SessionPhase::SynthesisRound(round);
            info!(
                "Phase 2: Synthesis round {}/{} with {} roles",
                round,
                params.rounds,
                active.len()
            );
            session.set_phase(phase);
            progress.on_phase_start(&phase, active.len());

            let positions: HashMap<RoleId, String> = session.positions().into_iter().collect();
            let query = session.query().content().to_string();
            let mut join_set = JoinSet::new();

            for role in &active {
                let own = positions.get(&role.id).cloned().unwrap_or_default();
                let peers: Vec<(String, String)> = active
                    .iter()
                    .filter(|peer| peer.id != role.id)
                    .filter_map(|peer| {
                        positions
                            .get(&peer.id)
                            .map(|content| (peer.title.clone(), content.clone()))
                    })
                    .collect();

                let gateway = Arc::clone(&self.gateway);
                let role = Arc::clone(role);
                let query = query.clone();
                let timeout = params.role_timeout;

                join_set.spawn(async move {
                    Self::critique_and_refine(gateway.as_ref(), &role, &query, &own, &peers, timeout)
                        .await
                });
            }

            let mut contributions = Vec::new();
            let interrupt =
                collect_until_interrupted(&mut join_set, token, deadline, |contribution| {
                    match &contribution.failure {
                        None => debug!("Role {} refined its position", contribution.role),
                        Some(failure) => warn!(
                            "Role {} failed in round {}: {}",
                            contribution.role, round, failure
                        ),
                    }
                    progress.on_task_complete(&phase, &contribution.role, contribution.is_success());
                    contributions.push(contribution);
                })
                .await;

            if let Some(interrupt) = interrupt {
                warn!(
                    "Round {} interrupted ({:?}); keeping positions from round {}",
                    round,
                    interrupt,
                    round - 1
                );
                progress.on_phase_complete(&phase);
                return Some(interrupt);
            }

            contributions.sort_by(|a, b| a.role.cmp(&b.role));
            active.retain(|role| {
                contributions
                    .iter()
                    .any(|c| c.role == role.id && c.is_success())
            });
            session.record_round(SynthesisRound {
                round,
                contributions,
            });
            progress.on_phase_complete(&phase);
        }

        None
    }

    /// Ask the moderator for a narrative; `Ok(None)` falls back to the
    /// built-in summary.
    ///
    /// The call is bounded by the remaining session budget as well as the
    /// role timeout.
    async fn moderate(
        &self,
        session: &ConsultationSession,
        consensus: &ConsensusBuckets,
        moderator: &Model,
        params: &ConsultationParams,
        token: &CancellationToken,
        deadline: Instant,
    ) -> Result<Option<(String, String)>, Interrupt> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(Interrupt::BudgetExhausted);
        }
        info!("Requesting synthesis narrative from {}", moderator);

        let positions: Vec<(String, String)> = session
            .positions()
            .into_iter()
            .map(|(role, content)| (role.to_string(), content))
            .collect();
        let summary = summarize_buckets(consensus, &session.excluded_roles());
        let request = InvocationRequest::new(
            Some(moderator.clone()),
            PromptTemplate::moderator_system(),
            PromptTemplate::moderator_prompt(session.query().content(), &positions, &summary),
            params.role_timeout.min(remaining),
        );

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Interrupt::Cancelled),
            _ = tokio::time::sleep_until(deadline) => return Err(Interrupt::BudgetExhausted),
            result = Self::invoke_bounded(self.gateway.as_ref(), request) => result,
        };

        match result {
            Ok(text) if !text.trim().is_empty() => Ok(Some((moderator.to_string(), text))),
            Ok(_) => {
                warn!("Moderator {} returned nothing; using built-in summary", moderator);
                Ok(None)
            }
            Err(failure) => {
                warn!(
                    "Moderator {} failed ({}); using built-in summary",
                    moderator, failure
                );
                Ok(None)
            }
        }
    }

    /// One role's turn in a synthesis round
    async fn critique_and_refine(
        gateway: &G,
        role: &RoleAgent,
        query: &str,
        own: &str,
        peers: &[(String, String)],
        timeout: Duration,
    ) -> RoundContribution {
        let request = InvocationRequest::new(
            role.model.clone(),
            role.system_prompt.clone(),
            PromptTemplate::critique_prompt(query, own, peers),
            timeout,
        );
        let critique = match Self::invoke_bounded(gateway, request).await {
            Ok(critique) => critique,
            Err(failure) => return RoundContribution::failed(role.id.clone(), None, failure),
        };

        let request = InvocationRequest::new(
            role.model.clone(),
            role.system_prompt.clone(),
            PromptTemplate::refine_prompt(query, own, &critique),
            timeout,
        );
        match Self::invoke_bounded(gateway, request).await {
            Ok(content) => {
                let confidence = parse_confidence(&content);
                RoundContribution::refined(
                    role.id.clone(),
                    critique,
                    RoleOutput::new(content, confidence),
                )
            }
            Err(failure) => RoundContribution::failed(role.id.clone(), Some(critique), failure),
        }
    }

    /// Invoke the gateway under the request's timeout, converting every
    /// failure into a [`RoleFailure`]
    async fn invoke_bounded(gateway: &G, request: InvocationRequest) -> Result<String, RoleFailure> {
        let limit = request.timeout;
        match tokio::time::timeout(limit, gateway.invoke(request)).await {
            Ok(Ok(content)) => Ok(content),
            Ok(Err(GatewayError::Timeout)) | Err(_) => Err(RoleFailure::Timeout(limit)),
            Ok(Err(e)) => Err(RoleFailure::Error(e.to_string())),
        }
    }
}

/// Longest budget honored as such; anything larger means "no budget"
const MAX_SESSION_BUDGET: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Deadline for a session started now, clamped so that huge budgets cannot
/// overflow `Instant`
fn session_deadline(budget: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(budget.min(MAX_SESSION_BUDGET))
        .or_else(|| now.checked_add(Duration::from_secs(24 * 60 * 60)))
        .unwrap_or(now)
}

/// Drain `join_set`, handing each finished task to `on_done`, until it is
/// empty, the token is cancelled or the deadline passes. On interruption the
/// remaining tasks are aborted.
async fn collect_until_interrupted<T: Send + 'static>(
    join_set: &mut JoinSet<T>,
    token: &CancellationToken,
    deadline: Instant,
    mut on_done: impl FnMut(T),
) -> Option<Interrupt> {
    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                join_set.abort_all();
                return Some(Interrupt::Cancelled);
            }
            _ = tokio::time::sleep_until(deadline) => {
                join_set.abort_all();
                return Some(Interrupt::BudgetExhausted);
            }
            next = join_set.join_next() => next,
        };

        match next {
            None => return None,
            Some(Ok(value)) => on_done(value),
            Some(Err(e)) => warn!("Task join error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectiveConfig, LifecycleConfig};
    use crate::use_cases::collective_coordinator::CollectiveCoordinator;
    use agora_domain::{LifecycleState, ReportStatus};
    use async_trait::async_trait;

    #[derive(Clone)]
    enum ScriptedResponse {
        Text(String),
        Error(String),
        /// Respond with the text after a delay
        Slow(Duration, String),
    }

    fn text(s: &str) -> ScriptedResponse {
        ScriptedResponse::Text(s.to_string())
    }

    fn slow(secs: u64, s: &str) -> ScriptedResponse {
        ScriptedResponse::Slow(Duration::from_secs(secs), s.to_string())
    }

    #[derive(Clone)]
    struct RoleScript {
        dispatch: ScriptedResponse,
        /// Used for both critique and refine calls
        round: ScriptedResponse,
    }

    /// Mock gateway answering per model, distinguishing dispatch prompts
    /// from round prompts
    struct ScriptedGateway {
        scripts: HashMap<String, RoleScript>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn new() -> Self {
            Self {
                scripts: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_role(
            mut self,
            model: &str,
            dispatch: ScriptedResponse,
            round: ScriptedResponse,
        ) -> Self {
            self.scripts
                .insert(model.to_string(), RoleScript { dispatch, round });
            self
        }

        fn calls_for(&self, model: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|m| *m == model).count()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn invoke(&self, request: InvocationRequest) -> Result<String, GatewayError> {
            let model = request.model.map(|m| m.to_string()).unwrap_or_default();
            self.calls.lock().unwrap().push(model.clone());

            let Some(script) = self.scripts.get(&model) else {
                return Err(GatewayError::ModelNotAvailable(model));
            };
            let response = if request.prompt.starts_with("You are consulted on") {
                script.dispatch.clone()
            } else {
                script.round.clone()
            };

            match response {
                ScriptedResponse::Text(t) => Ok(t),
                ScriptedResponse::Error(e) => Err(GatewayError::RequestFailed(e)),
                ScriptedResponse::Slow(delay, t) => {
                    tokio::time::sleep(delay).await;
                    Ok(t)
                }
            }
        }
    }

    #[derive(Default)]
    struct RecordingJournal(Mutex<Vec<CoreEvent>>);

    impl EventJournal for RecordingJournal {
        fn append(&self, event: &CoreEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn role(id: &str) -> Arc<RoleAgent> {
        Arc::new(
            RoleAgent::new(id, id.to_uppercase(), format!("You are {}.", id))
                .with_model(Model::new(id)),
        )
    }

    fn roles(ids: &[&str]) -> Vec<Arc<RoleAgent>> {
        ids.iter().map(|id| role(id)).collect()
    }

    fn input(ids: &[&str], params: ConsultationParams) -> ConsultInput {
        ConsultInput::new(Query::try_new("Which database?").unwrap(), roles(ids)).with_params(params)
    }

    fn params() -> ConsultationParams {
        ConsultationParams::default()
            .with_rounds(1)
            .with_role_timeout(Duration::from_secs(10))
            .with_session_budget(Duration::from_secs(300))
    }

    const PG: &str = "POSITION [storage]: use postgres\nCONFIDENCE: 0.8";
    const SQLITE: &str = "POSITION [storage]: use sqlite\nCONFIDENCE: 0.6";

    #[tokio::test]
    async fn test_no_roles() {
        let orchestrator = ConsultationOrchestrator::new(Arc::new(ScriptedGateway::new()));
        let result = orchestrator.consult(input(&[], params())).await;
        assert!(matches!(result, Err(ConsultationError::NoRoles)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_of_five_roles_time_out() {
        let gateway = ScriptedGateway::new()
            .with_role("r1", text(PG), text(PG))
            .with_role("r2", text(PG), text(PG))
            .with_role("r3", text(SQLITE), text(SQLITE))
            .with_role("r4", slow(120, PG), text(PG))
            .with_role("r5", slow(120, PG), text(PG));
        let orchestrator = ConsultationOrchestrator::new(Arc::new(gateway));

        let report = orchestrator
            .consult(input(&["r1", "r2", "r3", "r4", "r5"], params()))
            .await
            .unwrap();

        assert_eq!(report.status, ReportStatus::Complete);
        assert_eq!(report.count(RoleStatus::Success), 3);
        assert_eq!(report.count(RoleStatus::Timeout), 2);
        assert_eq!(report.rounds_completed, 1);
        assert_eq!(report.consensus.participants, 3);
        assert!(report.narrative.contains("Pending review: r4, r5"));

        let r4 = &report.attributions[3];
        assert_eq!(r4.result.role, RoleId::new("r4"));
        assert!(r4.annotation.as_deref().unwrap().starts_with("pending review"));
    }

    #[tokio::test]
    async fn test_all_roles_error_fails_session() {
        let gateway = ScriptedGateway::new()
            .with_role("r1", ScriptedResponse::Error("boom".into()), text(PG))
            .with_role("r2", ScriptedResponse::Error("boom".into()), text(PG));
        let journal = Arc::new(RecordingJournal::default());
        let orchestrator =
            ConsultationOrchestrator::new(Arc::new(gateway)).with_journal(journal.clone());

        let result = orchestrator.consult(input(&["r1", "r2"], params())).await;
        assert!(matches!(result, Err(ConsultationError::SessionFailed { .. })));

        let events = journal.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "consultation_failed");
        assert!(orchestrator.active_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_identical_consultations_give_identical_buckets() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_role("r1", text(PG), text(PG))
                .with_role("r2", text(PG), text(PG))
                .with_role("r3", text(SQLITE), text(SQLITE)),
        );
        let orchestrator = ConsultationOrchestrator::new(gateway);

        let first = orchestrator
            .consult(input(&["r3", "r1", "r2"], params()))
            .await
            .unwrap();
        let second = orchestrator
            .consult(input(&["r1", "r2", "r3"], params()))
            .await
            .unwrap();

        assert_eq!(first.consensus, second.consensus);
        assert_eq!(first.consensus.majority.len(), 1);
        assert_eq!(first.consensus.majority[0].stance, "use postgres");
        assert_eq!(first.consensus.dissent.len(), 1);
        assert_eq!(first.consensus.dissent[0].supporters, vec![RoleId::new("r3")]);
        assert_ne!(first.session_id, second.session_id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_round_keeps_completed_results() {
        let gateway = ScriptedGateway::new()
            .with_role("r1", text(PG), slow(50, PG))
            .with_role("r2", text(SQLITE), slow(50, SQLITE))
            .with_role("r3", ScriptedResponse::Error("down".into()), text(PG));
        let orchestrator = Arc::new(ConsultationOrchestrator::new(Arc::new(gateway)));
        let session_id = SessionId::new("cs-cancel");

        let handle = {
            let orchestrator = Arc::clone(&orchestrator);
            let input = input(
                &["r1", "r2", "r3"],
                params().with_rounds(3).with_role_timeout(Duration::from_secs(60)),
            )
            .with_session_id(session_id.clone());
            tokio::spawn(async move { orchestrator.consult(input).await })
        };

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(orchestrator.cancel_consultation(&session_id));

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.status, ReportStatus::Degraded);
        assert_eq!(report.degraded_reason, Some(DegradedReason::Cancelled));
        assert_eq!(report.rounds_completed, 0);
        assert_eq!(report.count(RoleStatus::Success), 2);
        assert_eq!(report.count(RoleStatus::Error), 1);
        assert_eq!(report.attributions[0].final_position.as_deref(), Some(PG));

        assert!(!orchestrator.cancel_consultation(&session_id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhausted_compiles_degraded() {
        let gateway = ScriptedGateway::new()
            .with_role("r1", text(PG), slow(25, PG))
            .with_role("r2", text(PG), slow(25, PG));
        let orchestrator = ConsultationOrchestrator::new(Arc::new(gateway));

        let params = params()
            .with_rounds(3)
            .with_role_timeout(Duration::from_secs(50))
            .with_session_budget(Duration::from_secs(60));
        let report = orchestrator.consult(input(&["r1", "r2"], params)).await.unwrap();

        assert!(report.is_degraded());
        assert_eq!(report.degraded_reason, Some(DegradedReason::SessionTimeout));
        assert_eq!(report.rounds_completed, 1);
        assert_eq!(report.consensus.unanimous.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_budget_does_not_overflow() {
        let gateway = ScriptedGateway::new()
            .with_role("r1", text(PG), text(PG))
            .with_role("r2", text(PG), text(PG));
        let orchestrator = ConsultationOrchestrator::new(Arc::new(gateway));

        let params = params().with_session_budget(Duration::from_secs(u64::MAX));
        let report = orchestrator.consult(input(&["r1", "r2"], params)).await.unwrap();

        assert!(!report.is_degraded());
        assert_eq!(report.rounds_completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_deadline_clamps_huge_budgets() {
        let start = Instant::now();
        assert_eq!(
            session_deadline(Duration::from_secs(30)),
            start + Duration::from_secs(30)
        );
        assert!(session_deadline(Duration::MAX) > start + Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_moderator_cannot_outlast_budget() {
        let gateway = ScriptedGateway::new()
            .with_role("r1", text(PG), text(PG))
            .with_role("r2", text(PG), text(PG))
            .with_role("moderator", text("unused"), slow(50, "late narrative"));
        let orchestrator = ConsultationOrchestrator::new(Arc::new(gateway));

        let params = params()
            .with_rounds(0)
            .with_role_timeout(Duration::from_secs(100))
            .with_session_budget(Duration::from_secs(30))
            .with_moderator(Model::new("moderator"));
        let started = Instant::now();
        let report = orchestrator.consult(input(&["r1", "r2"], params)).await.unwrap();

        assert!(started.elapsed() <= Duration::from_secs(30));
        assert!(report.is_degraded());
        assert_eq!(report.degraded_reason, Some(DegradedReason::SessionTimeout));
        assert!(report.moderator.is_none());
        assert_ne!(report.narrative, "late narrative");
        assert_eq!(report.consensus.unanimous.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhausted_without_success_fails() {
        let gateway = ScriptedGateway::new()
            .with_role("r1", slow(100, PG), text(PG))
            .with_role("r2", slow(100, PG), text(PG));
        let orchestrator = ConsultationOrchestrator::new(Arc::new(gateway));

        let params = params()
            .with_role_timeout(Duration::from_secs(200))
            .with_session_budget(Duration::from_secs(30));
        let result = orchestrator.consult(input(&["r1", "r2"], params)).await;
        assert!(matches!(result, Err(ConsultationError::SessionFailed { .. })));
    }

    #[tokio::test]
    async fn test_role_failing_in_round_sits_out_later_rounds() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_role("r1", text(PG), text(PG))
                .with_role("r2", text(PG), text(PG))
                .with_role("r3", text(SQLITE), ScriptedResponse::Error("flaky".into())),
        );
        let orchestrator = ConsultationOrchestrator::new(Arc::clone(&gateway));

        let report = orchestrator
            .consult(input(&["r1", "r2", "r3"], params().with_rounds(2)))
            .await
            .unwrap();

        assert_eq!(report.rounds_completed, 2);
        assert_eq!(report.rounds[0].contributions.len(), 3);
        assert!(!report.rounds[0].contributions[2].is_success());
        assert_eq!(report.rounds[1].contributions.len(), 2);
        // dispatch + one failed critique
        assert_eq!(gateway.calls_for("r3"), 2);
        // r3 keeps its dispatch position and still counts
        assert_eq!(report.consensus.participants, 3);
        assert_eq!(report.consensus.dissent[0].supporters, vec![RoleId::new("r3")]);
    }

    #[tokio::test]
    async fn test_zero_rounds_skips_synthesis() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_role("r1", text(PG), text(SQLITE))
                .with_role("r2", text(PG), text(SQLITE)),
        );
        let orchestrator = ConsultationOrchestrator::new(Arc::clone(&gateway));

        let report = orchestrator
            .consult(input(&["r1", "r2"], params().with_rounds(0)))
            .await
            .unwrap();
        assert_eq!(report.rounds_completed, 0);
        assert_eq!(report.consensus.unanimous[0].stance, "use postgres");
        assert_eq!(gateway.calls_for("r1"), 1);
    }

    #[tokio::test]
    async fn test_moderator_narrative_and_fallback() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_role("r1", text(PG), text(PG))
                .with_role("r2", text(PG), text(PG))
                .with_role("moderator", text("unused"), text("Everyone wants postgres.")),
        );
        let orchestrator = ConsultationOrchestrator::new(Arc::clone(&gateway));

        let report = orchestrator
            .consult(input(
                &["r1", "r2"],
                params().with_moderator(Model::new("moderator")),
            ))
            .await
            .unwrap();
        assert_eq!(report.moderator.as_deref(), Some("moderator"));
        assert_eq!(report.narrative, "Everyone wants postgres.");

        // Unknown moderator model: built-in summary instead
        let report = orchestrator
            .consult(input(&["r1", "r2"], params().with_moderator(Model::new("absent"))))
            .await
            .unwrap();
        assert!(report.moderator.is_none());
        assert!(report.narrative.contains("Agreed by all"));
    }

    #[tokio::test]
    async fn test_resting_requester_is_refused() {
        let coordinator = Arc::new(CollectiveCoordinator::new(CollectiveConfig::default()));
        let lifecycle = Arc::new(LifecycleController::new(
            LifecycleConfig::default(),
            coordinator,
        ));
        let sleeper = AgentId::new("sleeper");
        let awake = AgentId::new("awake");
        lifecycle.register(sleeper.clone(), "worker");
        lifecycle.register(awake.clone(), "worker");
        lifecycle.transition(&sleeper, LifecycleState::Rest).unwrap();

        let gateway = ScriptedGateway::new()
            .with_role("r1", text(PG), text(PG))
            .with_role("r2", text(PG), text(PG));
        let orchestrator =
            ConsultationOrchestrator::new(Arc::new(gateway)).with_lifecycle(lifecycle);

        let refused = orchestrator
            .consult(input(&["r1", "r2"], params()).with_requester(sleeper.clone()))
            .await;
        assert!(matches!(refused, Err(ConsultationError::RequesterResting(id)) if id == sleeper));

        let unknown = orchestrator
            .consult(input(&["r1", "r2"], params()).with_requester(AgentId::new("nobody")))
            .await;
        assert!(matches!(
            unknown,
            Err(ConsultationError::Lifecycle(TransitionError::UnknownAgent(_)))
        ));

        let report = orchestrator
            .consult(input(&["r1", "r2"], params()).with_requester(awake))
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::Complete);
    }

    #[tokio::test]
    async fn test_completed_event_is_journaled() {
        let gateway = ScriptedGateway::new()
            .with_role("r1", text(PG), text(PG))
            .with_role("r2", ScriptedResponse::Error("x".into()), text(PG));
        let journal = Arc::new(RecordingJournal::default());
        let orchestrator =
            ConsultationOrchestrator::new(Arc::new(gateway)).with_journal(journal.clone());

        orchestrator.consult(input(&["r1", "r2"], params())).await.unwrap();

        let events = journal.0.lock().unwrap();
        match &events[..] {
            [CoreEvent::ConsultationCompleted { succeeded, failed, rounds, .. }] => {
                assert_eq!((*succeeded, *failed, *rounds), (1, 1, 0));
            }
            other => panic!("unexpected events {:?}", other),
        }
    }
}
