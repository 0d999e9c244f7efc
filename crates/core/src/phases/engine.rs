use thiserror::Error;

use crate::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::session::SessionId;
use crate::phases::states::{FlowKind, Phase, PhaseContext, TransitionOutcome, TurnEvent};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PhaseError {
    #[error("invalid transition from {phase:?} using event {event:?}")]
    InvalidTransition { phase: Phase, event: TurnEvent },
    #[error("session is closed; no further events are accepted")]
    SessionClosed,
}

/// One agent variant's finite-state model. Implementations must be pure:
/// the next phase and its side effects depend only on the arguments.
pub trait PhaseFlow {
    fn kind(&self) -> FlowKind;
    fn initial_phase(&self) -> Phase;
    fn transition(
        &self,
        current: &Phase,
        event: &TurnEvent,
        ctx: &PhaseContext,
    ) -> Result<TransitionOutcome, PhaseError>;
}

impl PhaseFlow for Box<dyn PhaseFlow + Send + Sync> {
    fn kind(&self) -> FlowKind {
        self.as_ref().kind()
    }

    fn initial_phase(&self) -> Phase {
        self.as_ref().initial_phase()
    }

    fn transition(
        &self,
        current: &Phase,
        event: &TurnEvent,
        ctx: &PhaseContext,
    ) -> Result<TransitionOutcome, PhaseError> {
        self.as_ref().transition(current, event, ctx)
    }
}

pub struct PhaseEngine<F> {
    flow: F,
}

impl<F> PhaseEngine<F>
where
    F: PhaseFlow,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn kind(&self) -> FlowKind {
        self.flow.kind()
    }

    pub fn initial_phase(&self) -> Phase {
        self.flow.initial_phase()
    }

    pub fn apply(
        &self,
        current: &Phase,
        event: &TurnEvent,
        ctx: &PhaseContext,
    ) -> Result<TransitionOutcome, PhaseError> {
        self.flow.transition(current, event, ctx)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &Phase,
        event: &TurnEvent,
        ctx: &PhaseContext,
        sink: &S,
        session_id: &SessionId,
    ) -> Result<TransitionOutcome, PhaseError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event, ctx);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        session_id.clone(),
                        "phase.transition_applied",
                        AuditCategory::Phase,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        session_id.clone(),
                        "phase.transition_rejected",
                        AuditCategory::Phase,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}
