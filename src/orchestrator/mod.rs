//! Orchestrator Module
//!
//! Validates requests, fans them out to domain agents under a deadline,
//! and synthesizes whatever comes back.

pub mod profile;
pub mod request;
pub mod activation;
pub mod aggregation;
pub mod error;
pub mod supervisor;
#[macro_use]
pub mod event_bus;

pub use supervisor::Orchestrator;
pub use profile::{OrganizationProfile, ProfileManager, RiskTolerance};
pub use request::{CustomDataRecord, DataScope, OrchestrationRequest, OrchestrationRequestBuilder, RawOrchestrationRequest};
pub use activation::resolve_activation;
pub use aggregation::{HistoricalPatterns, Synthesis, SynthesisEngine, SynthesizedAnalysis};
pub use error::{AgentFailure, OrchestrationError, OrchestrationResult};
pub use event_bus::{EventBus, OrchestrationEvent, Settlement, ORCHESTRATION_EVENT_BUS};
