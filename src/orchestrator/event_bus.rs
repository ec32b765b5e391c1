//! Internal Event Bus for Orchestration Telemetry
//!
//! Provides a centralized, asynchronous pub/sub channel that reports run and
//! agent lifecycle events to any interested observer.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use std::sync::Arc;

use crate::agent::AgentType;

/// How a single agent invocation settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    Responded,
    TimedOut,
    Failed,
}

/// Orchestration lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OrchestrationEvent {
    RunStarted { run_id: String, agents: Vec<AgentType> },
    AgentSettled { run_id: String, agent: AgentType, settlement: Settlement, latency_ms: u128 },
    RunCompleted { run_id: String, responders: usize, confidence_level: u8 },
    RunFailed { run_id: String, reason: String },
    RunCancelled { run_id: String },
}

impl OrchestrationEvent {
    pub fn run_id(&self) -> &str {
        match self {
            OrchestrationEvent::RunStarted { run_id, .. }
            | OrchestrationEvent::AgentSettled { run_id, .. }
            | OrchestrationEvent::RunCompleted { run_id, .. }
            | OrchestrationEvent::RunFailed { run_id, .. }
            | OrchestrationEvent::RunCancelled { run_id } => run_id,
        }
    }
}

pub struct EventBus {
    tx: broadcast::Sender<OrchestrationEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: OrchestrationEvent) {
        let _ = self.tx.send(event);
    }

    /// Create a new subscriber
    pub fn subscribe(&self) -> broadcast::Receiver<OrchestrationEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    /// Global singleton instance of the EventBus
    pub static ref ORCHESTRATION_EVENT_BUS: Arc<EventBus> = Arc::new(EventBus::new());
}

/// Helper macro to publish events globally
#[macro_export]
macro_rules! emit_event {
    ($event:expr) => {
        $crate::orchestrator::event_bus::ORCHESTRATION_EVENT_BUS.publish($event);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(OrchestrationEvent::RunCancelled { run_id: "r1".into() });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.run_id(), "r1");
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        EventBus::new().publish(OrchestrationEvent::RunFailed { run_id: "r".into(), reason: "x".into() });
    }
}
