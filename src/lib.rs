//! Agency Synthesis
//!
//! Multi-agent strategic analysis for organizations:
//! - Seven domain agents (historical, government, banking, corporate, market, risk, custom)
//! - Concurrent fan-out with per-agent deadlines and cancellation
//! - Deterministic synthesis of confidence, gaps and precedent patterns

pub mod agent;
pub mod orchestrator;
pub mod config;
pub mod utils;

// Re-exports for convenience
pub use agent::{AgentRegistry, AgentResponse, AgentType, DomainAgent, KnowledgeSource};
pub use config::OrchestratorConfig;
pub use orchestrator::{
    OrchestrationError, OrchestrationRequest, Orchestrator, OrganizationProfile, RawOrchestrationRequest,
    SynthesizedAnalysis,
};
