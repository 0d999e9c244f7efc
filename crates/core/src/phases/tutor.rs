use crate::phases::engine::{PhaseError, PhaseFlow};
use crate::phases::states::{
    FlowKind, Phase, PhaseContext, SideEffect, TransitionOutcome, TurnEvent,
};

pub const CANCEL_ACKNOWLEDGEMENT: &str =
    "Alright, great session today. Keep recalling those concepts. Bye for now!";

/// The active-recall tutor. The phase is the current mode; mode changes are
/// explicit (the user asks for quizzing or teaching back) and always imply a
/// persona handoff, never implicit turn counting.
#[derive(Clone, Copy, Debug, Default)]
pub struct TutorFlow;

/// Mode requests the tutor recognizes in a transcript. This mirrors the
/// instructions the original coach gave its language model; keeping the
/// detection here makes the handoff deterministic and testable.
fn requested_mode(transcript: &str) -> Option<(Phase, &'static str)> {
    let text = transcript.to_lowercase();
    if text.contains("quiz") {
        Some((Phase::Quiz, "quiz"))
    } else if text.contains("teach back") || text.contains("teach-back") {
        Some((Phase::TeachBack, "teach_back"))
    } else if text.contains("teach me") || text.contains("explain") {
        Some((Phase::Learn, "learn"))
    } else {
        None
    }
}

impl PhaseFlow for TutorFlow {
    fn kind(&self) -> FlowKind {
        FlowKind::Tutor
    }

    fn initial_phase(&self) -> Phase {
        Phase::Learn
    }

    fn transition(
        &self,
        current: &Phase,
        event: &TurnEvent,
        _ctx: &PhaseContext,
    ) -> Result<TransitionOutcome, PhaseError> {
        use Phase::{Closed, Done, Learn, Quiz, TeachBack};
        use SideEffect::{
            InvokeTool, RequestReaction, ScheduleDisconnect, Speak, SwitchPersona,
        };
        use TurnEvent::{AgentUtteranceFinished, CancelRequested, UserTurnCompleted};

        if current.is_terminal() {
            return Err(PhaseError::SessionClosed);
        }

        let (to, effects) = match (current, event) {
            (_, CancelRequested(_)) => {
                (Done, vec![Speak(CANCEL_ACKNOWLEDGEMENT.to_owned())])
            }
            (Learn | Quiz | TeachBack, UserTurnCompleted(text)) => {
                match requested_mode(text) {
                    Some((next_mode, mode_name)) if next_mode != *current => (
                        next_mode,
                        vec![
                            InvokeTool {
                                name: "switch_mode".to_owned(),
                                args: serde_json::json!({ "mode": mode_name }),
                            },
                            SwitchPersona { mode: mode_name.to_owned() },
                            RequestReaction { transcript: text.clone() },
                        ],
                    ),
                    _ => (
                        current.clone(),
                        vec![RequestReaction { transcript: text.clone() }],
                    ),
                }
            }
            (Learn | Quiz | TeachBack, AgentUtteranceFinished) => {
                return Ok(TransitionOutcome::stay(current, event));
            }
            (Done, AgentUtteranceFinished) => (Closed, vec![ScheduleDisconnect]),
            (Done, UserTurnCompleted(_)) => {
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

#[cfg(test)]
mod tests {
    use crate::phases::engine::PhaseFlow;
    use crate::phases::states::{CancelReason, Phase, PhaseContext, SideEffect, TurnEvent};

    use super::TutorFlow;

    fn user(text: &str) -> TurnEvent {
        TurnEvent::UserTurnCompleted(text.to_owned())
    }

    #[test]
    fn quiz_request_switches_mode_via_tool_and_handoff() {
        let flow = TutorFlow;
        let outcome = flow
            .transition(&Phase::Learn, &user("okay, quiz me on this"), &PhaseContext::default())
            .unwrap();

        assert_eq!(outcome.to, Phase::Quiz);
        assert!(matches!(
            &outcome.effects[0],
            SideEffect::InvokeTool { name, .. } if name == "switch_mode"
        ));
        assert!(matches!(
            &outcome.effects[1],
            SideEffect::SwitchPersona { mode } if mode == "quiz"
        ));
    }

    #[test]
    fn plain_turn_stays_in_mode_and_requests_reaction() {
        let flow = TutorFlow;
        let outcome = flow
            .transition(
                &Phase::Quiz,
                &user("the answer is inertia"),
                &PhaseContext::default(),
            )
            .unwrap();

        assert_eq!(outcome.to, Phase::Quiz);
        assert_eq!(
            outcome.effects,
            vec![SideEffect::RequestReaction { transcript: "the answer is inertia".to_owned() }]
        );
    }

    #[test]
    fn repeating_the_current_mode_does_not_re_handoff() {
        let flow = TutorFlow;
        let outcome = flow
            .transition(&Phase::Quiz, &user("quiz me again"), &PhaseContext::default())
            .unwrap();

        assert_eq!(outcome.to, Phase::Quiz);
        assert!(!outcome
            .effects
            .iter()
            .any(|e| matches!(e, SideEffect::SwitchPersona { .. })));
    }

    #[test]
    fn teach_back_request_is_recognized() {
        let flow = TutorFlow;
        let outcome = flow
            .transition(
                &Phase::Learn,
                &user("let me teach back what I learned"),
                &PhaseContext::default(),
            )
            .unwrap();
        assert_eq!(outcome.to, Phase::TeachBack);
    }

    #[test]
    fn cancel_routes_through_wind_down() {
        let flow = TutorFlow;
        let outcome = flow
            .transition(
                &Phase::TeachBack,
                &TurnEvent::CancelRequested(CancelReason::Keyword("goodbye".to_owned())),
                &PhaseContext::default(),
            )
            .unwrap();
        assert_eq!(outcome.to, Phase::Done);

        let outcome = flow
            .transition(&outcome.to, &TurnEvent::AgentUtteranceFinished, &PhaseContext::default())
            .unwrap();
        assert_eq!(outcome.to, Phase::Closed);
        assert_eq!(outcome.effects, vec![SideEffect::ScheduleDisconnect]);
    }
}
