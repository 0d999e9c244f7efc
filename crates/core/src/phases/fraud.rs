use crate::phases::engine::{PhaseError, PhaseFlow};
use crate::phases::states::{
    FlowKind, Phase, PhaseContext, SideEffect, TransitionOutcome, TurnEvent,
};
use crate::verify::{VerificationGate, VerificationOutcome};

pub const CANCEL_ACKNOWLEDGEMENT: &str =
    "Understood, we can end the call here. If you have any concerns, please call the number on the back of your card. Goodbye.";
pub const VERIFICATION_FAILED_CLOSING: &str =
    "I'm sorry, I wasn't able to verify your identity, so I can't discuss this account. Please call the number on the back of your card. Goodbye.";
pub const RETRY_PROMPT: &str =
    "That doesn't match what we have on file. Could you answer the security question once more?";
pub const CONFIRMED_SAFE_CLOSING: &str =
    "Thank you for confirming. The transaction has been marked as authorized and your card remains active. Have a good day.";
pub const CONFIRMED_FRAUD_CLOSING: &str =
    "Thank you. We have marked the transaction as fraudulent, blocked the card, and a replacement is on the way. Goodbye.";
pub const CLARIFY_AUTHORIZATION: &str =
    "Just to confirm, did you make this transaction? Please answer yes or no.";

/// The fraud-verification call. Identity is gated on the stored security
/// answer; a verified customer confirms or repudiates the transaction and the
/// outcome is reported exactly once before the wind-down.
#[derive(Clone, Copy, Debug, Default)]
pub struct FraudFlow;

/// Repudiation wins when both signals appear ("no, I did not").
fn authorization_answer(transcript: &str) -> Option<bool> {
    let text = transcript.to_lowercase();
    let words: Vec<&str> = text.split(|c: char| !c.is_alphanumeric()).collect();
    let denies = words.iter().any(|w| matches!(*w, "no" | "nope" | "fraud"))
        || text.contains("did not")
        || text.contains("didn't")
        || text.contains("not me");
    if denies {
        return Some(false);
    }
    let affirms = words.iter().any(|w| matches!(*w, "yes" | "yeah" | "yep"))
        || text.contains("i did")
        || text.contains("that was me")
        || text.contains("authorized");
    if affirms {
        return Some(true);
    }
    None
}

fn submit_report_effect(ctx: &PhaseContext, status: &str, notes: &str) -> SideEffect {
    SideEffect::InvokeTool {
        name: "submit_report".to_owned(),
        args: serde_json::json!({
            "user_name": ctx.case_user.clone().unwrap_or_default(),
            "status": status,
            "notes": notes,
        }),
    }
}

impl PhaseFlow for FraudFlow {
    fn kind(&self) -> FlowKind {
        FlowKind::Fraud
    }

    fn initial_phase(&self) -> Phase {
        Phase::Unverified
    }

    fn transition(
        &self,
        current: &Phase,
        event: &TurnEvent,
        ctx: &PhaseContext,
    ) -> Result<TransitionOutcome, PhaseError> {
        use Phase::{Closed, Done, Reported, Unverified, VerificationFailed, Verified};
        use SideEffect::{
            MarkVerified, RecordFailedAttempt, ScheduleDisconnect, Speak,
        };
        use TurnEvent::{AgentUtteranceFinished, CancelRequested, UserTurnCompleted};

        if current.is_terminal() {
            return Err(PhaseError::SessionClosed);
        }

        let (to, effects) = match (current, event) {
            (_, CancelRequested(_)) => {
                (Done, vec![Speak(CANCEL_ACKNOWLEDGEMENT.to_owned())])
            }
            (Unverified, UserTurnCompleted(text)) => {
                let Some(expected) = ctx.expected_answer.as_deref() else {
                    return Err(PhaseError::InvalidTransition {
                        phase: current.clone(),
                        event: event.clone(),
                    });
                };
                let mut gate = VerificationGate::resume(
                    ctx.max_verification_attempts,
                    ctx.verification_attempts,
                );
                match gate.check(expected, text) {
                    VerificationOutcome::Verified => {
                        let summary = ctx.transaction_summary.clone().unwrap_or_default();
                        let readout = format!(
                            "Thank you, your identity is verified. I'm calling about a suspicious transaction: {summary}. Did you authorize this transaction?"
                        );
                        (Verified, vec![MarkVerified, Speak(readout)])
                    }
                    VerificationOutcome::Exhausted => (
                        VerificationFailed,
                        vec![
                            RecordFailedAttempt,
                            Speak(VERIFICATION_FAILED_CLOSING.to_owned()),
                        ],
                    ),
                    VerificationOutcome::Retry { .. } => (
                        Unverified,
                        vec![RecordFailedAttempt, Speak(RETRY_PROMPT.to_owned())],
                    ),
                }
            }
            (Verified, UserTurnCompleted(text)) => match authorization_answer(text) {
                Some(true) => (
                    Reported,
                    vec![
                        submit_report_effect(ctx, "confirmed_safe", "customer authorized the transaction"),
                        Speak(CONFIRMED_SAFE_CLOSING.to_owned()),
                    ],
                ),
                Some(false) => (
                    Reported,
                    vec![
                        submit_report_effect(ctx, "confirmed_fraud", "customer repudiated the transaction"),
                        Speak(CONFIRMED_FRAUD_CLOSING.to_owned()),
                    ],
                ),
                None => (Verified, vec![Speak(CLARIFY_AUTHORIZATION.to_owned())]),
            },
            (Reported | VerificationFailed | Done, AgentUtteranceFinished) => {
                (Closed, vec![ScheduleDisconnect])
            }
            (Unverified | Verified, AgentUtteranceFinished)
            | (Reported | VerificationFailed | Done, UserTurnCompleted(_)) => {
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
    use crate::phases::states::{Phase, PhaseContext, SideEffect, TurnEvent};

    use super::FraudFlow;

    fn ctx(attempts: u32) -> PhaseContext {
        PhaseContext {
            verification_attempts: attempts,
            max_verification_attempts: 3,
            expected_answer: Some("Blue".to_owned()),
            transaction_summary: Some("Acme Electronics for $742.50".to_owned()),
            case_user: Some("John".to_owned()),
            ..PhaseContext::default()
        }
    }

    fn user(text: &str) -> TurnEvent {
        TurnEvent::UserTurnCompleted(text.to_owned())
    }

    #[test]
    fn wrong_then_right_answer_moves_unverified_to_verified() {
        let flow = FraudFlow;

        let outcome = flow.transition(&Phase::Unverified, &user("red"), &ctx(0)).unwrap();
        assert_eq!(outcome.to, Phase::Unverified);
        assert!(outcome.effects.contains(&SideEffect::RecordFailedAttempt));

        let outcome = flow.transition(&Phase::Unverified, &user("blue"), &ctx(1)).unwrap();
        assert_eq!(outcome.to, Phase::Verified);
        assert!(outcome.effects.contains(&SideEffect::MarkVerified));
    }

    #[test]
    fn whitespace_and_case_do_not_block_verification() {
        let flow = FraudFlow;
        let outcome = flow.transition(&Phase::Unverified, &user("  BLUE  "), &ctx(0)).unwrap();
        assert_eq!(outcome.to, Phase::Verified);
    }

    #[test]
    fn third_failed_attempt_terminates_verification() {
        let flow = FraudFlow;
        let outcome = flow.transition(&Phase::Unverified, &user("green"), &ctx(2)).unwrap();
        assert_eq!(outcome.to, Phase::VerificationFailed);
        assert!(matches!(outcome.effects.last(), Some(SideEffect::Speak(_))));

        let outcome = flow
            .transition(&outcome.to, &TurnEvent::AgentUtteranceFinished, &ctx(3))
            .unwrap();
        assert_eq!(outcome.to, Phase::Closed);
    }

    #[test]
    fn attempt_cap_follows_the_configured_maximum() {
        let flow = FraudFlow;
        let tight = PhaseContext { max_verification_attempts: 2, ..ctx(0) };

        let outcome = flow.transition(&Phase::Unverified, &user("green"), &tight).unwrap();
        assert_eq!(outcome.to, Phase::Unverified);

        let tight = PhaseContext { max_verification_attempts: 2, ..ctx(1) };
        let outcome = flow.transition(&Phase::Unverified, &user("green"), &tight).unwrap();
        assert_eq!(outcome.to, Phase::VerificationFailed);
    }

    #[test]
    fn authorized_transaction_is_reported_safe() {
        let flow = FraudFlow;
        let outcome =
            flow.transition(&Phase::Verified, &user("yes, that was me"), &ctx(1)).unwrap();
        assert_eq!(outcome.to, Phase::Reported);
        match &outcome.effects[0] {
            SideEffect::InvokeTool { name, args } => {
                assert_eq!(name, "submit_report");
                assert_eq!(args["status"], "confirmed_safe");
                assert_eq!(args["user_name"], "John");
            }
            other => panic!("expected submit_report tool call, got {other:?}"),
        }
    }

    #[test]
    fn repudiated_transaction_is_reported_fraud() {
        let flow = FraudFlow;
        let outcome =
            flow.transition(&Phase::Verified, &user("no, I did not make that"), &ctx(1)).unwrap();
        assert_eq!(outcome.to, Phase::Reported);
        match &outcome.effects[0] {
            SideEffect::InvokeTool { args, .. } => {
                assert_eq!(args["status"], "confirmed_fraud");
            }
            other => panic!("expected submit_report tool call, got {other:?}"),
        }
    }

    #[test]
    fn ambiguous_authorization_answer_asks_for_yes_or_no() {
        let flow = FraudFlow;
        let outcome =
            flow.transition(&Phase::Verified, &user("hmm let me think"), &ctx(1)).unwrap();
        assert_eq!(outcome.to, Phase::Verified);
        assert_eq!(outcome.effects.len(), 1);
        assert!(matches!(outcome.effects[0], SideEffect::Speak(_)));
    }
}
