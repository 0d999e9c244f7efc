use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowKind {
    Round,
    Tutor,
    Fraud,
}

/// Union of the per-variant phase vocabularies. A session holds exactly one
/// phase at a time; each flow only ever produces phases from its own subset
/// (plus the shared `Done`/`Closed` wind-down pair).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    // round-driven flow (improv game and its relatives)
    Intro,
    AwaitingInput,
    Reacting,
    // tutor flow: the phase is the active mode
    Learn,
    Quiz,
    TeachBack,
    // fraud verification flow
    Unverified,
    Verified,
    Reported,
    VerificationFailed,
    // shared wind-down: a closing utterance always precedes disconnect
    Done,
    Closed,
}

impl Phase {
    /// Terminal means no further event will ever be accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Closed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// Derived from a cancel keyword in the user's transcript.
    Keyword(String),
    /// Requested from outside the conversation (operator, transport drop).
    External,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    UserTurnCompleted(String),
    AgentUtteranceFinished,
    CancelRequested(CancelReason),
}

/// Ordered actions a transition asks the router to perform. The router
/// executes them strictly in sequence, awaiting each before the next.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideEffect {
    /// Bump the session round counter.
    AdvanceRound,
    /// Draw the next scenario from the deck and speak its round prompt.
    SelectScenario,
    Speak(String),
    /// Ask the LLM for a reaction to the transcript and speak it.
    RequestReaction { transcript: String },
    InvokeTool { name: String, args: Value },
    SwitchPersona { mode: String },
    MarkVerified,
    RecordFailedAttempt,
    ScheduleDisconnect,
}

/// Read-only slice of session and policy state a transition may consult.
/// Transitions are pure functions of (phase, event, context).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseContext {
    pub round: u32,
    pub max_rounds: u32,
    pub verification_attempts: u32,
    pub max_verification_attempts: u32,
    pub expected_answer: Option<String>,
    pub transaction_summary: Option<String>,
    pub case_user: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: Phase,
    pub to: Phase,
    pub event: TurnEvent,
    pub effects: Vec<SideEffect>,
}

impl TransitionOutcome {
    pub fn stay(phase: &Phase, event: &TurnEvent) -> Self {
        Self { from: phase.clone(), to: phase.clone(), event: event.clone(), effects: Vec::new() }
    }
}
