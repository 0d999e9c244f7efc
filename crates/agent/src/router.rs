//! The per-session turn event router.
//!
//! One bounded queue, one consuming loop. Exactly one transition is in
//! flight per session, and the side effects of each transition are executed
//! and awaited in order before the next event is dequeued. FIFO order of
//! external events is preserved across every suspension point.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use parley_core::{
    AuditCategory, AuditEvent, AuditOutcome, AuditSink, CancelReason, PhaseContext,
    PhaseEngine, PhaseError, PhaseFlow, ScenarioDeck, Session, SideEffect, TurnEvent,
};

use crate::guardrails::CancelPolicy;
use crate::handoff::{AgentHandoff, HandoffOutcome};
use crate::tools::ToolRegistry;
use crate::voice::{LlmClient, VoicePipeline};

const EVENT_QUEUE_CAPACITY: usize = 32;

/// Cheap cloneable producer handle for the session's event queue.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<TurnEvent>,
}

impl EventSender {
    pub async fn send(&self, event: TurnEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| anyhow!("session event queue is closed"))
    }

    pub async fn user_turn(&self, transcript: impl Into<String>) -> Result<()> {
        self.send(TurnEvent::UserTurnCompleted(transcript.into())).await
    }

    pub async fn utterance_finished(&self) -> Result<()> {
        self.send(TurnEvent::AgentUtteranceFinished).await
    }

    pub async fn cancel(&self, reason: CancelReason) -> Result<()> {
        self.send(TurnEvent::CancelRequested(reason)).await
    }
}

/// Everything a router needs besides the session and its flow.
pub struct RouterDeps {
    pub registry: ToolRegistry,
    pub handoff: Arc<AgentHandoff>,
    pub pipeline: Arc<dyn VoicePipeline>,
    pub llm: Arc<dyn LlmClient>,
    pub sink: Arc<dyn AuditSink>,
    pub cancel: CancelPolicy,
    pub deck: ScenarioDeck,
    /// Static slice of the phase context: policy limits and case data.
    /// Round and attempt counters are filled in from the session per event.
    pub base_context: PhaseContext,
}

/// Owns one [`Session`] exclusively and is the only writer of its state.
pub struct TurnEventRouter {
    session: Session,
    engine: PhaseEngine<Box<dyn PhaseFlow + Send + Sync>>,
    deps: RouterDeps,
    rx: mpsc::Receiver<TurnEvent>,
}

impl TurnEventRouter {
    pub fn new(
        session: Session,
        flow: Box<dyn PhaseFlow + Send + Sync>,
        deps: RouterDeps,
    ) -> (Self, EventSender) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let engine = PhaseEngine::new(flow);
        (Self { session, engine, deps, rx }, EventSender { tx })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Consume events until the session reaches its terminal phase or all
    /// senders are dropped. Returns the final session state.
    pub async fn run(mut self) -> Session {
        while let Some(event) = self.rx.recv().await {
            let event = self.apply_guardrails(event);
            let context = self.context();

            let outcome = match self.engine.apply_with_audit(
                &self.session.phase,
                &event,
                &context,
                self.deps.sink.as_ref(),
                &self.session.id,
            ) {
                Ok(outcome) => outcome,
                Err(PhaseError::SessionClosed) => break,
                Err(error) => {
                    // The flow tables are total over real pipeline orderings,
                    // so a rejection here is an internal fault. Keep the call
                    // alive with a spoken fallback.
                    error!(session = %self.session.id, %error, "router.transition_rejected");
                    let fallback = parley_core::ApplicationError::from(
                        parley_core::DomainError::from(error),
                    );
                    self.speak(fallback.user_message()).await;
                    continue;
                }
            };

            self.session.phase = outcome.to.clone();
            for effect in outcome.effects {
                self.execute(effect).await;
            }

            if self.session.phase.is_terminal() {
                info!(session = %self.session.id, "session.closed");
                break;
            }
        }
        self.session
    }

    /// Cancel keywords replace the user turn outright; the flow only ever
    /// sees the cancellation.
    fn apply_guardrails(&self, event: TurnEvent) -> TurnEvent {
        match event {
            TurnEvent::UserTurnCompleted(transcript) => {
                match self.deps.cancel.scan(&transcript) {
                    Some(reason) => {
                        info!(session = %self.session.id, ?reason, "guardrail.cancel_matched");
                        TurnEvent::CancelRequested(reason)
                    }
                    None => TurnEvent::UserTurnCompleted(transcript),
                }
            }
            other => other,
        }
    }

    fn context(&self) -> PhaseContext {
        PhaseContext {
            round: self.session.round,
            verification_attempts: self.session.verification_attempts,
            ..self.deps.base_context.clone()
        }
    }

    async fn execute(&mut self, effect: SideEffect) {
        match effect {
            SideEffect::AdvanceRound => {
                self.session.round += 1;
            }
            SideEffect::SelectScenario => {
                let scenario = self
                    .deps
                    .deck
                    .draw()
                    .unwrap_or_else(|| "improvise a scene of your choosing".to_owned());
                let round = self.session.round;
                self.speak(&format!("Round {round}: {scenario}")).await;
            }
            SideEffect::Speak(utterance) => {
                self.speak(&utterance).await;
            }
            SideEffect::RequestReaction { transcript } => {
                self.react(&transcript).await;
            }
            SideEffect::InvokeTool { name, args } => {
                self.invoke_tool(&name, args).await;
            }
            SideEffect::SwitchPersona { mode } => {
                self.switch_persona(&mode).await;
            }
            SideEffect::MarkVerified => {
                self.session.set_field("identity_verified", "true");
            }
            SideEffect::RecordFailedAttempt => {
                self.session.verification_attempts += 1;
            }
            SideEffect::ScheduleDisconnect => {
                self.deps.sink.emit(AuditEvent::new(
                    self.session.id.clone(),
                    "session.disconnect_scheduled",
                    AuditCategory::System,
                    AuditOutcome::Success,
                ));
            }
        }
    }

    /// Narration goes through the LLM; a failed completion degrades to a
    /// neutral spoken line instead of silence.
    async fn react(&mut self, transcript: &str) {
        let persona = self.deps.handoff.active().await;
        let prompt = format!(
            "{}\n\nThe user just said: \"{transcript}\"\nRespond in character, briefly.",
            persona.instructions
        );
        match self.deps.llm.complete(&prompt).await {
            Ok(reaction) => self.speak(&reaction).await,
            Err(error) => {
                warn!(session = %self.session.id, %error, "llm.completion_failed");
                self.speak("Let's keep going. What happens next?").await;
            }
        }
    }

    async fn invoke_tool(&mut self, name: &str, args: serde_json::Value) {
        match self.deps.registry.invoke(name, args).await {
            Ok(_) => {
                self.deps.sink.emit(
                    AuditEvent::new(
                        self.session.id.clone(),
                        "tool.invocation_succeeded",
                        AuditCategory::Tool,
                        AuditOutcome::Success,
                    )
                    .with_metadata("tool", name.to_owned()),
                );
            }
            Err(error) => {
                self.deps.sink.emit(
                    AuditEvent::new(
                        self.session.id.clone(),
                        "tool.invocation_failed",
                        AuditCategory::Tool,
                        AuditOutcome::Failed,
                    )
                    .with_metadata("tool", name.to_owned())
                    .with_metadata("error", error.to_string()),
                );
                self.speak(error.user_message()).await;
            }
        }
    }

    async fn switch_persona(&mut self, mode: &str) {
        match self.deps.handoff.switch(mode).await {
            Ok(HandoffOutcome::Switched(descriptor)) => {
                self.session.persona_mode = descriptor.mode;
                self.deps.sink.emit(
                    AuditEvent::new(
                        self.session.id.clone(),
                        "persona.switched",
                        AuditCategory::Persona,
                        AuditOutcome::Success,
                    )
                    .with_metadata("mode", descriptor.mode.as_str().to_owned()),
                );
            }
            Ok(HandoffOutcome::Rejected { correction }) => {
                self.speak(&correction).await;
            }
            Err(error) => {
                warn!(session = %self.session.id, %error, "persona.switch_failed");
                self.speak("Let's stay in the current mode for now.").await;
            }
        }
    }

    async fn speak(&self, utterance: &str) {
        if let Err(error) = self.deps.pipeline.speak(utterance).await {
            error!(session = %self.session.id, %error, "pipeline.speak_failed");
        }
    }
}
