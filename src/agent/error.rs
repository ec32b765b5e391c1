use thiserror::Error;

use crate::agent::AgentType;

/// Errors raised inside a single agent invocation.
/// The orchestrator converts these into gaps; they never reach the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("no findings")]
    NoFindings,

    #[error("retrieval for '{topic}' failed after {attempts} attempt(s): {message}")]
    Retrieval { topic: String, attempts: u32, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("no agent registered for {0}")]
    NotRegistered(AgentType),
}

pub type AgentResult<T> = std::result::Result<T, AgentError>;
