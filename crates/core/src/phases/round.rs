use crate::phases::engine::{PhaseError, PhaseFlow};
use crate::phases::states::{
    FlowKind, Phase, PhaseContext, SideEffect, TransitionOutcome, TurnEvent,
};

pub const CANCEL_ACKNOWLEDGEMENT: &str =
    "No problem, we can stop here. Thanks for playing, and see you next time!";
pub const CLOSING_SUMMARY: &str =
    "That's the end of the game! You were fantastic out there. Thanks for playing!";

/// The round-driven improv flow: an intro turn, a fixed number of
/// prompt/response/reaction rounds, then a spoken wind-down.
///
/// Benign cross-talk (an utterance finishing while we already await input,
/// the user speaking over the reaction) is a stay-put outcome rather than a
/// rejection, so the table stays total over real pipeline event orderings.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundFlow;

impl PhaseFlow for RoundFlow {
    fn kind(&self) -> FlowKind {
        FlowKind::Round
    }

    fn initial_phase(&self) -> Phase {
        Phase::Intro
    }

    fn transition(
        &self,
        current: &Phase,
        event: &TurnEvent,
        ctx: &PhaseContext,
    ) -> Result<TransitionOutcome, PhaseError> {
        use Phase::{AwaitingInput, Closed, Done, Intro, Reacting};
        use SideEffect::{
            AdvanceRound, RequestReaction, ScheduleDisconnect, SelectScenario, Speak,
        };
        use TurnEvent::{AgentUtteranceFinished, CancelRequested, UserTurnCompleted};

        if current.is_terminal() {
            return Err(PhaseError::SessionClosed);
        }

        let (to, effects) = match (current, event) {
            // Cancellation pre-empts every phase but still routes through the
            // wind-down so the user always hears a closing utterance.
            (_, CancelRequested(_)) => {
                (Done, vec![Speak(CANCEL_ACKNOWLEDGEMENT.to_owned())])
            }
            (Intro, UserTurnCompleted(_)) => {
                (AwaitingInput, vec![AdvanceRound, SelectScenario])
            }
            (AwaitingInput, UserTurnCompleted(text)) => {
                (Reacting, vec![RequestReaction { transcript: text.clone() }])
            }
            (Reacting, AgentUtteranceFinished) if ctx.round < ctx.max_rounds => {
                (AwaitingInput, vec![AdvanceRound, SelectScenario])
            }
            (Reacting, AgentUtteranceFinished) => {
                (Done, vec![Speak(CLOSING_SUMMARY.to_owned())])
            }
            (Done, AgentUtteranceFinished) => (Closed, vec![ScheduleDisconnect]),
            // Cross-talk and repeated completions settle in place.
            (Intro | AwaitingInput, AgentUtteranceFinished)
            | (Reacting | Done, UserTurnCompleted(_)) => {
                return Ok(TransitionOutcome::stay(current, event));
            }
            _ => {
                return Err(PhaseError::InvalidTransition {
                    phase: current.clone(),
                    event: event.clone(),
                });
            }
        };

        Ok(TransitionOutcome { from: current.clone(), to, event: event.clone(), effects })
    }
}
