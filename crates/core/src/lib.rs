//! Parley core - domain model and conversation state machines
//!
//! This crate holds everything about a voice conversation that can be
//! reasoned about deterministically: the record types persisted between
//! sessions, the phase state machines that drive each agent variant, the
//! persona catalog, scenario selection, identity verification, and the
//! shared error and audit vocabulary.
//!
//! # Safety principle
//!
//! The LLM is strictly a narrator. Phase advancement, verification
//! outcomes, and every persisted side effect are deterministic decisions
//! made here, never by model output.

pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod persona;
pub mod phases;
pub mod scenario;
pub mod verify;

pub use audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink};
pub use domain::concept::Concept;
pub use domain::fraud::FraudCase;
pub use domain::lead::Lead;
pub use domain::order::{Order, OrderItem};
pub use domain::session::{Session, SessionId};
pub use domain::wellness::WellnessEntry;
pub use errors::{ApplicationError, DomainError, ToolError};
pub use persona::{PersonaCatalog, PersonaDescriptor, PersonaMode};
pub use phases::engine::{PhaseEngine, PhaseError, PhaseFlow};
pub use phases::states::{
    CancelReason, FlowKind, Phase, PhaseContext, SideEffect, TransitionOutcome, TurnEvent,
};
pub use scenario::ScenarioDeck;
pub use verify::{answers_match, VerificationGate, VerificationOutcome};
