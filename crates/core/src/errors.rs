use thiserror::Error;

use crate::phases::engine::PhaseError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error("identity verification exhausted after {attempts} attempts")]
    VerificationExhausted { attempts: u32 },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failures crossing the tool dispatch boundary. Every variant maps to a
/// speakable fallback so a broken tool never ends the call abruptly.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for tool `{tool}`: {message}")]
    InvalidArguments { tool: String, message: String },
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
}

impl ToolError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) | Self::InvalidArguments { .. } => {
                "I'm sorry, I wasn't able to do that just now. Let's keep going."
            }
            Self::NotFound(_) => {
                "I'm sorry, I couldn't find that record. Could you say that again?"
            }
            Self::Persistence(_) => {
                "I'm sorry, I couldn't save that just now. Let me note it and we can continue."
            }
            Self::Execution(_) => {
                "I'm sorry, something went wrong on my end. Let's continue."
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// The spoken fallback for a failure the user should never see raw.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "I'm sorry, I lost my place for a moment. Where were we?",
            Self::Tool(tool) => tool.user_message(),
            Self::Persistence(_) => {
                "I'm sorry, I couldn't save that just now. Let me note it and we can continue."
            }
            Self::Configuration(_) => {
                "I'm sorry, something is misconfigured on my end. Let's continue for now."
            }
        }
    }
}
