pub mod engine;
pub mod fraud;
pub mod round;
pub mod states;
pub mod tutor;

pub use engine::{PhaseEngine, PhaseError, PhaseFlow};
pub use fraud::FraudFlow;
pub use round::RoundFlow;
pub use states::{
    CancelReason, FlowKind, Phase, PhaseContext, SideEffect, TransitionOutcome, TurnEvent,
};
pub use tutor::TutorFlow;
