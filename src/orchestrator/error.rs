use thiserror::Error;

use crate::agent::AgentType;

/// Request-level errors. Every variant is fatal to the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid agent type: '{0}'")]
    InvalidAgentType(String),

    #[error("No agent produced a response ({attempted} attempted)")]
    EmptyAgentSet { attempted: usize, gaps: Vec<String> },

    #[error("Orchestration cancelled")]
    Cancelled,
}

pub type OrchestrationResult<T> = std::result::Result<T, OrchestrationError>;

/// A single agent that settled without a usable response.
/// Non-fatal: the run continues and the failure becomes a data gap.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentFailure {
    #[error("agent {agent} timed out")]
    Timeout { agent: AgentType, after_ms: u64 },

    #[error("agent {agent} failed: {message}")]
    Execution { agent: AgentType, message: String },
}

impl AgentFailure {
    pub fn agent(&self) -> AgentType {
        match self {
            AgentFailure::Timeout { agent, .. } | AgentFailure::Execution { agent, .. } => *agent,
        }
    }

    /// Gap entry recorded in the synthesis in place of the missing response
    pub fn gap(&self) -> String {
        self.to_string()
    }
}
