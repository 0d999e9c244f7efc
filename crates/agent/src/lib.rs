//! Agent runtime - turn orchestration for voice conversations
//!
//! This crate provides the "brain" of the parley system - the per-session
//! runtime that:
//! - Routes turn events through the deterministic phase flows
//! - Enforces cancel-keyword guardrails before the flow sees a turn
//! - Dispatches tool calls against the record store
//! - Swaps personas (instructions, voice, tool set) atomically on handoff
//!
//! # Architecture
//!
//! The runtime follows a constrained loop:
//! 1. **Guardrails** (`guardrails`) - Scan the transcript for session-ending keywords
//! 2. **Phase transition** (`router`) - Apply the event to the active flow
//! 3. **Effect execution** (`router`) - Speak, invoke tools, switch personas, in order
//! 4. **Session close** - Schedule disconnect once the flow reaches its terminal phase
//!
//! # Key Types
//!
//! - `AgentRuntime` - Per-session wiring (see `runtime` module)
//! - `TurnEventRouter` - Single consumer of the turn event queue
//! - `VoicePipeline` / `LlmClient` - Pluggable trait seams for speech and narration
//!
//! # Safety Principle
//!
//! The LLM is strictly a narrator. It NEVER decides phase transitions, verification
//! outcomes, or record contents. Those are deterministic decisions made by the core.

pub mod guardrails;
pub mod handoff;
pub mod router;
pub mod runtime;
pub mod tools;
pub mod voice;

pub use guardrails::CancelPolicy;
pub use handoff::{AgentHandoff, HandoffOutcome};
pub use router::{EventSender, TurnEventRouter};
pub use runtime::AgentRuntime;
pub use tools::{ArgKind, ArgSpec, Tool, ToolRegistry, ToolSpec};
pub use voice::{ConsolePipeline, LlmClient, ScriptedLlm, VoicePipeline};
