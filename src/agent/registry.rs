use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::knowledge::KnowledgeSource;
use crate::agent::retry::RetryPolicy;
use crate::agent::{AgentType, CustomDataAgent, DomainAgent, HistoricalAgent, SpecialistAgent};

/// Maps each agent type to the implementation that serves it
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentType, Arc<dyn DomainAgent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All seven agents wired to one knowledge source
    pub fn standard(source: Arc<dyn KnowledgeSource>, retry: RetryPolicy) -> Self {
        let mut registry = Self::new();
        for agent_type in AgentType::ALL {
            let agent: Arc<dyn DomainAgent> = match agent_type {
                AgentType::Historical => Arc::new(HistoricalAgent::new(source.clone()).with_retry(retry.clone())),
                AgentType::Custom => Arc::new(
                    CustomDataAgent::new()
                        .with_corroboration(source.clone())
                        .with_retry(retry.clone()),
                ),
                other => Arc::new(SpecialistAgent::new(other, source.clone()).with_retry(retry.clone())),
            };
            registry.register(agent);
        }
        registry
    }

    /// Register an agent under its own type, replacing any previous one
    pub fn register(&mut self, agent: Arc<dyn DomainAgent>) -> &mut Self {
        self.agents.insert(agent.agent_type(), agent);
        self
    }

    pub fn get(&self, agent_type: AgentType) -> Option<Arc<dyn DomainAgent>> {
        self.agents.get(&agent_type).cloned()
    }

    pub fn contains(&self, agent_type: AgentType) -> bool {
        self.agents.contains_key(&agent_type)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::knowledge::StaticKnowledgeSource;

    #[test]
    fn test_standard_registry_covers_every_type() {
        let registry = AgentRegistry::standard(Arc::new(StaticKnowledgeSource::default()), RetryPolicy::default());
        assert_eq!(registry.len(), 7);
        for agent_type in AgentType::ALL {
            assert_eq!(registry.get(agent_type).unwrap().agent_type(), agent_type);
        }
    }

    #[test]
    fn test_register_replaces_by_type() {
        let source: Arc<dyn KnowledgeSource> = Arc::new(StaticKnowledgeSource::default());
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(SpecialistAgent::new(AgentType::Market, source.clone())));
        registry.register(Arc::new(SpecialistAgent::new(AgentType::Market, source)));
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(AgentType::Risk));
    }
}
