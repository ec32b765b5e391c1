//! Orchestrator
//!
//! Fans one request out to the activated domain agents, collects what they
//! produce under timeout and cancellation, and hands the survivors to the
//! synthesis engine.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::{info, warn};
use futures_util::future::join_all;

use crate::agent::{AgentError, AgentRegistry, AgentResponse, AgentType, DomainAgent};
use crate::config::{saturating_millis, OrchestratorConfig};
use crate::emit_event;
use crate::orchestrator::activation::resolve_activation;
use crate::orchestrator::aggregation::{SynthesisEngine, SynthesizedAnalysis};
use crate::orchestrator::error::{AgentFailure, OrchestrationError, OrchestrationResult};
use crate::orchestrator::event_bus::{OrchestrationEvent, Settlement};
use crate::orchestrator::request::{OrchestrationRequest, RawOrchestrationRequest};

type Settled = (Result<AgentResponse, AgentFailure>, Duration);

pub struct Orchestrator {
    registry: AgentRegistry,
    config: OrchestratorConfig,
    concurrency_limit: Arc<Semaphore>,
}

impl Orchestrator {
    pub fn new(registry: AgentRegistry) -> Self {
        Self::with_config(registry, OrchestratorConfig::default())
    }

    pub fn with_config(registry: AgentRegistry, config: OrchestratorConfig) -> Self {
        Self {
            concurrency_limit: Arc::new(Semaphore::new(config.max_concurrent_agents.max(1))),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Validate a wire request and run it
    pub async fn run_raw(&self, raw: RawOrchestrationRequest) -> OrchestrationResult<SynthesizedAnalysis> {
        let request = OrchestrationRequest::try_from(raw)?;
        self.run(request).await
    }

    pub async fn run(&self, request: OrchestrationRequest) -> OrchestrationResult<SynthesizedAnalysis> {
        self.run_with_cancellation(request, CancellationToken::new()).await
    }

    /// Run a request; cancelling `cancel` stops every in-flight agent and
    /// fails the whole run with `Cancelled`.
    #[tracing::instrument(skip_all, fields(query_len = request.query().len()))]
    pub async fn run_with_cancellation(
        &self,
        request: OrchestrationRequest,
        cancel: CancellationToken,
    ) -> OrchestrationResult<SynthesizedAnalysis> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let agents = resolve_activation(&request);
        info!(run_id = %run_id, "Activating {} agent(s): {:?}", agents.len(), agents);
        emit_event!(OrchestrationEvent::RunStarted { run_id: run_id.clone(), agents: agents.clone() });

        if cancel.is_cancelled() {
            emit_event!(OrchestrationEvent::RunCancelled { run_id });
            return Err(OrchestrationError::Cancelled);
        }

        let request = Arc::new(request);
        let timeout = self.config.agent_timeout();
        // Dropping a handle aborts its agent, so no task outlives the run
        let mut tasks = Vec::with_capacity(agents.len());

        for &agent_type in &agents {
            let agent = self.registry.get(agent_type);
            let request = request.clone();
            let semaphore = self.concurrency_limit.clone();
            let cancel = cancel.clone();
            tasks.push(AbortOnDropHandle::new(tokio::spawn(async move {
                invoke(agent_type, agent, request, semaphore, timeout, cancel).await
            })));
        }

        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            results = join_all(tasks.iter_mut()) => Some(results),
        };

        let Some(results) = joined else {
            drop(tasks);
            warn!(run_id = %run_id, "Run cancelled with agents in flight");
            emit_event!(OrchestrationEvent::RunCancelled { run_id });
            return Err(OrchestrationError::Cancelled);
        };

        let mut responses = Vec::with_capacity(agents.len());
        let mut failure_gaps = Vec::new();

        for (&agent_type, joined) in agents.iter().zip(results) {
            let (outcome, latency) = joined.unwrap_or_else(|e| {
                let message = if e.is_panic() { "agent task panicked".to_string() } else { e.to_string() };
                (Err(AgentFailure::Execution { agent: agent_type, message }), Duration::ZERO)
            });

            let settlement = match outcome {
                Ok(response) => {
                    info!(run_id = %run_id, "Agent {} responded in {:?} (confidence {})", agent_type, latency, response.confidence);
                    responses.push(response);
                    Settlement::Responded
                }
                Err(failure) => {
                    warn!(run_id = %run_id, "{}", failure);
                    let settlement = match failure {
                        AgentFailure::Timeout { .. } => Settlement::TimedOut,
                        AgentFailure::Execution { .. } => Settlement::Failed,
                    };
                    failure_gaps.push(failure.gap());
                    settlement
                }
            };
            emit_event!(OrchestrationEvent::AgentSettled {
                run_id: run_id.clone(),
                agent: agent_type,
                settlement,
                latency_ms: latency.as_millis(),
            });
        }

        if responses.is_empty() {
            let err = OrchestrationError::EmptyAgentSet {
                attempted: agents.len(),
                gaps: failure_gaps,
            };
            warn!(run_id = %run_id, "{}", err);
            emit_event!(OrchestrationEvent::RunFailed { run_id, reason: err.to_string() });
            return Err(err);
        }

        let analysis = SynthesisEngine::synthesize(request.query(), responses, &failure_gaps)?;
        info!(
            run_id = %run_id,
            "Synthesized {} response(s), confidence {}",
            analysis.agent_responses.len(),
            analysis.synthesis.confidence_level
        );
        emit_event!(OrchestrationEvent::RunCompleted {
            run_id,
            responders: analysis.agent_responses.len(),
            confidence_level: analysis.synthesis.confidence_level,
        });
        Ok(analysis)
    }
}

/// One agent invocation. The deadline starts once a concurrency permit is held.
async fn invoke(
    agent_type: AgentType,
    agent: Option<Arc<dyn DomainAgent>>,
    request: Arc<OrchestrationRequest>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
    cancel: CancellationToken,
) -> Settled {
    let Some(agent) = agent else {
        let message = AgentError::NotRegistered(agent_type).to_string();
        return (Err(AgentFailure::Execution { agent: agent_type, message }), Duration::ZERO);
    };

    let _permit = tokio::select! {
        _ = cancel.cancelled() => None,
        permit = semaphore.acquire_owned() => permit.ok(),
    };
    if cancel.is_cancelled() {
        let message = "cancelled".to_string();
        return (Err(AgentFailure::Execution { agent: agent_type, message }), Duration::ZERO);
    }

    let started = Instant::now();
    let outcome = tokio::select! {
        _ = cancel.cancelled() => Err(AgentFailure::Execution { agent: agent_type, message: "cancelled".to_string() }),
        result = tokio::time::timeout(timeout, agent.analyze(&request)) => match result {
            Err(_) => Err(AgentFailure::Timeout { agent: agent_type, after_ms: saturating_millis(timeout) }),
            Ok(Err(e)) => Err(AgentFailure::Execution { agent: agent_type, message: e.to_string() }),
            Ok(Ok(response)) => response
                .validate(agent_type)
                .map(|_| response)
                .map_err(|e| AgentFailure::Execution { agent: agent_type, message: e.to_string() }),
        },
    };
    (outcome, started.elapsed())
}
