//! Specialist Agents
//!
//! Government, banking, corporate, market and risk agents share one shape:
//! research the domain's topics through the knowledge source, keep the
//! best-ranked evidence, and frame recommendations from the domain playbook.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::agent::knowledge::{Evidence, KnowledgeSource};
use crate::agent::retry::{retrieve_with_retry, RetryPolicy};
use crate::agent::{AgentError, AgentResponse, AgentResult, AgentType, DomainAgent};
use crate::orchestrator::profile::{OrganizationProfile, RiskTolerance};
use crate::orchestrator::request::OrchestrationRequest;
use crate::utils::dedup_preserving_order;

/// Evidence collected across an agent's research topics
#[derive(Debug, Default)]
pub(crate) struct Gathered {
    /// Top-ranked items kept under the per-topic cap
    pub evidence: Vec<Evidence>,
    /// Every distinct item retrieved, before the cap
    pub matched: Vec<Evidence>,
    pub gaps: Vec<String>,
}

impl Gathered {
    pub fn findings(&self) -> Vec<String> {
        dedup_preserving_order(self.evidence.iter().map(|e| e.text.as_str()))
    }

    pub fn provenance(&self) -> Vec<String> {
        dedup_preserving_order(self.evidence.iter().map(|e| e.provenance.as_str()))
    }

    pub fn lead_provenance(&self) -> Option<&str> {
        self.evidence.first().map(|e| e.provenance.as_str())
    }
}

/// Query each topic in order, keeping up to `per_topic` items per topic.
///
/// Topics that return nothing or fail become gaps. The agent only fails when
/// no topic produced evidence; a retrieval error is reported in that case.
pub(crate) async fn gather(
    source: &dyn KnowledgeSource,
    retry: &RetryPolicy,
    profile: &OrganizationProfile,
    topics: &[String],
    per_topic: usize,
) -> AgentResult<Gathered> {
    let mut gathered = Gathered::default();
    let mut last_error = None;

    for topic in topics {
        match retrieve_with_retry(source, profile, topic, retry).await {
            Ok(found) if found.is_empty() => {
                gathered.gaps.push(format!("No evidence retrieved for '{}'", topic));
            }
            Ok(found) => {
                debug!("Kept {} of {} evidence items for '{}'", found.len().min(per_topic), found.len(), topic);
                for (rank, ev) in found.into_iter().enumerate() {
                    if rank < per_topic && !gathered.evidence.iter().any(|e| e.text == ev.text) {
                        gathered.evidence.push(ev.clone());
                    }
                    if !gathered.matched.iter().any(|e| e.text == ev.text) {
                        gathered.matched.push(ev);
                    }
                }
            }
            Err(e) => {
                gathered.gaps.push(e.to_string());
                last_error = Some(e);
            }
        }
    }

    if gathered.evidence.is_empty() {
        return Err(last_error.unwrap_or(AgentError::NoFindings));
    }
    Ok(gathered)
}

/// Profile-specific next steps for a domain
pub(crate) fn playbook(agent_type: AgentType, profile: &OrganizationProfile, gathered: &Gathered) -> Vec<String> {
    let country = profile.country_or_global();
    let sector = profile.primary_sector();
    let lead = gathered.lead_provenance().unwrap_or("the strongest available source");

    match agent_type {
        AgentType::Historical => vec![
            format!("Apply the success factors documented in {} precedents", country),
            format!("Avoid the failure modes recorded across {} comparable cases", gathered.evidence.len()),
            format!("Benchmark the {} plan against historical timelines", profile.expansion_timeline),
        ],
        AgentType::Government => vec![
            format!("Engage the {} investment promotion agency before committing capital", country),
            format!("Negotiate {} incentives benchmarked against {}", sector, lead),
            format!("Time entry to the {} fiscal and policy cycle", country),
        ],
        AgentType::Banking => vec![
            format!("Shortlist lenders with a record of {} financing in {}", sector, country),
            format!("Structure financing to hedge {} currency exposure", country),
            format!("Benchmark loan terms against {}", lead),
        ],
        AgentType::Corporate => vec![
            format!("Map the partnership models used by {} entrants in {}", profile.revenue_band, country),
            format!("Stage investment against {} milestones", profile.expansion_timeline),
        ],
        AgentType::Market => vec![
            format!("Target the underserved {} segments identified in {}", sector, lead),
            format!("Validate entry barriers with local distributors in {}", country),
        ],
        AgentType::Risk => {
            let triggers = match profile.risk_tolerance {
                RiskTolerance::Low => "Set conservative exit triggers before first capital deployment",
                RiskTolerance::Medium => "Set staged intervention triggers tied to each investment tranche",
                RiskTolerance::High => "Set explicit loss limits to bound the high-tolerance exposure",
            };
            vec![
                triggers.to_string(),
                format!("Monitor policy, currency and supply-chain indicators in {}", country),
            ]
        }
        AgentType::Custom => vec![
            "Validate custom data against independent sources".to_string(),
            "Use custom data to calibrate forecasts".to_string(),
        ],
    }
}

/// Assemble a response from gathered evidence
pub(crate) fn respond(agent_type: AgentType, request: &OrchestrationRequest, gathered: &Gathered) -> AgentResponse {
    let base = AgentResponse::for_agent(agent_type);
    let sources = dedup_preserving_order(base.sources.iter().cloned().chain(gathered.provenance()));
    let gaps = dedup_preserving_order(base.gaps.iter().cloned().chain(gathered.gaps.iter().cloned()));
    let data_age = request.data_scope().data_age(base.data_age);

    let mut response = base
        .with_findings(gathered.findings())
        .with_recommendations(playbook(agent_type, request.profile(), gathered))
        .with_gaps(gaps)
        .with_data_age(data_age);
    response.sources = sources;
    response
}

/// Domain agent backed by a knowledge source
pub struct SpecialistAgent {
    agent_type: AgentType,
    source: Arc<dyn KnowledgeSource>,
    retry: RetryPolicy,
}

impl SpecialistAgent {
    pub fn new(agent_type: AgentType, source: Arc<dyn KnowledgeSource>) -> Self {
        Self {
            agent_type,
            source,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl DomainAgent for SpecialistAgent {
    fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    async fn analyze(&self, request: &OrchestrationRequest) -> AgentResult<AgentResponse> {
        let topics = self.agent_type.topics(request.profile(), request.query());
        let gathered = gather(
            self.source.as_ref(),
            &self.retry,
            request.profile(),
            &topics,
            request.data_scope().evidence_per_topic(),
        )
        .await?;
        Ok(respond(self.agent_type, request, &gathered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::knowledge::SourceError;
    use crate::orchestrator::request::DataScope;

    /// Five ranked items per topic; regulatory topics fail
    struct TopicSource;

    #[async_trait]
    impl KnowledgeSource for TopicSource {
        async fn retrieve(&self, _profile: &OrganizationProfile, topic: &str) -> Result<Vec<Evidence>, SourceError> {
            if topic.contains("regulatory") {
                return Err(SourceError::Permanent("archive offline".into()));
            }
            Ok((0..5)
                .map(|i| Evidence::new(format!("{} #{}", topic, i), format!("registry {}", i % 2), 1.0 - i as f32 * 0.1))
                .collect())
        }
    }

    struct EmptySource;

    #[async_trait]
    impl KnowledgeSource for EmptySource {
        async fn retrieve(&self, _profile: &OrganizationProfile, _topic: &str) -> Result<Vec<Evidence>, SourceError> {
            Ok(vec![])
        }
    }

    fn request(scope: DataScope) -> OrchestrationRequest {
        OrchestrationRequest::builder()
            .profile(OrganizationProfile {
                country: "Vietnam".into(),
                industry: vec!["Energy".into()],
                ..OrganizationProfile::default()
            })
            .query("market entry")
            .data_scope(scope)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_government_agent_keeps_partial_evidence() {
        let agent = SpecialistAgent::new(AgentType::Government, Arc::new(TopicSource));
        let res = agent.analyze(&request(DataScope::Recent)).await.unwrap();

        assert_eq!(res.agent_type, AgentType::Government);
        assert_eq!(res.confidence, 90);
        // incentives topic kept 2 items, regulatory topic failed
        assert_eq!(res.findings.len(), 2);
        assert!(res.findings[0].starts_with("Vietnam investment incentives"));
        assert!(res.gaps.iter().any(|g| g.contains("archive offline")));
        assert!(res.sources.contains(&"registry 0".to_string()));
        assert!(res.recommendations[0].contains("Vietnam"));
        assert!(res.validate(AgentType::Government).is_ok());
    }

    #[tokio::test]
    async fn test_scope_changes_depth_and_coverage() {
        let agent = SpecialistAgent::new(AgentType::Risk, Arc::new(TopicSource));
        let recent = agent.analyze(&request(DataScope::Recent)).await.unwrap();
        let historical = agent.analyze(&request(DataScope::Historical)).await.unwrap();

        assert_eq!(recent.findings.len(), 4);
        assert_eq!(historical.findings.len(), 8);
        assert_eq!(recent.data_age, 5);
        assert_eq!(historical.data_age, 30);
    }

    #[tokio::test]
    async fn test_no_evidence_is_no_findings() {
        let agent = SpecialistAgent::new(AgentType::Market, Arc::new(EmptySource));
        let err = agent.analyze(&request(DataScope::Comprehensive)).await.unwrap_err();
        assert_eq!(err, AgentError::NoFindings);
    }

    #[tokio::test]
    async fn test_all_topics_failing_reports_retrieval_error() {
        struct DownSource;

        #[async_trait]
        impl KnowledgeSource for DownSource {
            async fn retrieve(&self, _profile: &OrganizationProfile, _topic: &str) -> Result<Vec<Evidence>, SourceError> {
                Err(SourceError::Permanent("down".into()))
            }
        }

        let agent = SpecialistAgent::new(AgentType::Banking, Arc::new(DownSource));
        let err = agent.analyze(&request(DataScope::Comprehensive)).await.unwrap_err();
        assert!(matches!(err, AgentError::Retrieval { .. }));
    }

    #[test]
    fn test_risk_playbook_follows_tolerance() {
        let profile = OrganizationProfile {
            risk_tolerance: RiskTolerance::Low,
            ..OrganizationProfile::default()
        };
        let steps = playbook(AgentType::Risk, &profile, &Gathered::default());
        assert!(steps[0].contains("conservative"));
    }
}
