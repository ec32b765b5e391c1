use crate::agent::{AgentType, DEFAULT_ACTIVATION};
use crate::orchestrator::request::OrchestrationRequest;

/// Canonical activation order for a request.
///
/// An explicit list is used as given. Otherwise the six default agents run,
/// followed by `custom` when the request includes custom data.
pub fn resolve_activation(request: &OrchestrationRequest) -> Vec<AgentType> {
    match request.agents_to_activate() {
        Some(agents) => agents.to_vec(),
        None => {
            let mut agents = DEFAULT_ACTIVATION.to_vec();
            if request.include_custom_data() {
                agents.push(AgentType::Custom);
            }
            agents
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::profile::OrganizationProfile;

    fn base() -> crate::orchestrator::request::OrchestrationRequestBuilder {
        OrchestrationRequest::builder()
            .profile(OrganizationProfile::default())
            .query("market entry")
    }

    #[test]
    fn test_default_activation() {
        let agents = resolve_activation(&base().build().unwrap());
        assert_eq!(agents, DEFAULT_ACTIVATION.to_vec());
    }

    #[test]
    fn test_default_activation_with_custom_data() {
        let agents = resolve_activation(&base().include_custom_data(true).build().unwrap());
        assert_eq!(agents.len(), 7);
        assert_eq!(agents.last(), Some(&AgentType::Custom));
    }

    #[test]
    fn test_explicit_order_is_preserved() {
        let request = base()
            .agents([AgentType::Risk, AgentType::Historical])
            .include_custom_data(true)
            .build()
            .unwrap();
        assert_eq!(resolve_activation(&request), vec![AgentType::Risk, AgentType::Historical]);
    }
}
