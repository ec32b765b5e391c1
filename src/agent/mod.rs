//! Agent Module
//!
//! The domain-agent contract, its seven variants, and the knowledge-source
//! collaborator they draw evidence from.

mod types;
mod response;
mod error;
mod specialist;
mod historical;
mod custom;
mod registry;
pub mod knowledge;
pub mod provider;
pub mod cache;
pub mod retry;

pub use types::{AgentType, DomainBrief, DEFAULT_ACTIVATION};
pub use response::{AgentResponse, HistoricalSignal};
pub use error::{AgentError, AgentResult};
pub use specialist::SpecialistAgent;
pub use historical::{HistoricalAgent, INSUFFICIENT_HISTORY};
pub use custom::{CustomDataAgent, RecordSource};
pub use registry::AgentRegistry;
pub use knowledge::{Evidence, KnowledgeSource, SourceError, StaticKnowledgeSource};
pub use provider::OpenAICompatibleSource;
pub use cache::{EvidenceCache, CachedSource};
pub use retry::RetryPolicy;

use async_trait::async_trait;

use crate::orchestrator::request::OrchestrationRequest;

/// Trait for domain-specialist agents.
///
/// An agent sees only the request: never shared mutable state and never
/// another agent's output.
#[async_trait]
pub trait DomainAgent: Send + Sync {
    /// The slot this agent serves
    fn agent_type(&self) -> AgentType;

    /// Produce one structured response for the request
    async fn analyze(&self, request: &OrchestrationRequest) -> AgentResult<AgentResponse>;
}
