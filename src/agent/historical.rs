//! Historical Pattern Agent
//!
//! Searches precedents across economic cycles, policy shifts and
//! organizational pivots, and summarizes them as a `HistoricalSignal`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::agent::knowledge::{Evidence, KnowledgeSource};
use crate::agent::retry::RetryPolicy;
use crate::agent::specialist::{gather, respond};
use crate::agent::{AgentResponse, AgentResult, AgentType, DomainAgent, HistoricalSignal};
use crate::orchestrator::request::OrchestrationRequest;

pub const INSUFFICIENT_HISTORY: &str = "insufficient historical data";

pub struct HistoricalAgent {
    source: Arc<dyn KnowledgeSource>,
    retry: RetryPolicy,
}

impl HistoricalAgent {
    pub fn new(source: Arc<dyn KnowledgeSource>) -> Self {
        Self {
            source,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Summarize precedent evidence. Only outcome-tagged precedents count toward
/// the success rate, and only `duration_months` tags toward the timeline.
pub fn summarize_precedents(precedents: &[Evidence]) -> HistoricalSignal {
    let outcomes: Vec<&str> = precedents.iter().filter_map(|e| e.tag_value("outcome")).collect();
    let successes = outcomes.iter().filter(|o| o.eq_ignore_ascii_case("success")).count();
    let success_rate = (!outcomes.is_empty()).then(|| {
        ((successes * 200 + outcomes.len()) / (outcomes.len() * 2)) as u8
    });

    let durations: Vec<u32> = precedents
        .iter()
        .filter_map(|e| e.tag_value("duration_months"))
        .filter_map(|d| d.parse().ok())
        .collect();
    let timeline = match (durations.iter().min(), durations.iter().max()) {
        (Some(min), Some(max)) if min == max => {
            format!("{} months across {} precedent(s)", min, durations.len())
        }
        (Some(min), Some(max)) => format!("{}-{} months across {} precedents", min, max, durations.len()),
        _ => INSUFFICIENT_HISTORY.to_string(),
    };

    HistoricalSignal {
        similar_cases: precedents.len() as u32,
        success_rate,
        timeline,
    }
}

#[async_trait]
impl DomainAgent for HistoricalAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Historical
    }

    async fn analyze(&self, request: &OrchestrationRequest) -> AgentResult<AgentResponse> {
        let topics = AgentType::Historical.topics(request.profile(), request.query());
        let gathered = gather(
            self.source.as_ref(),
            &self.retry,
            request.profile(),
            &topics,
            request.data_scope().evidence_per_topic(),
        )
        .await?;

        let signal = summarize_precedents(&gathered.matched);
        Ok(respond(AgentType::Historical, request, &gathered).with_historical_signal(signal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::knowledge::StaticKnowledgeSource;
    use crate::agent::knowledge::CorpusEntry;
    use crate::orchestrator::profile::OrganizationProfile;
    use crate::orchestrator::request::DataScope;

    fn precedent(tags: &[&str]) -> Evidence {
        Evidence::new("case", "archive", 1.0).with_tags(tags.iter().copied())
    }

    #[test]
    fn test_summarize_precedents() {
        let signal = summarize_precedents(&[
            precedent(&["outcome:success", "duration_months:18"]),
            precedent(&["outcome:failure", "duration_months:30"]),
            precedent(&["outcome:success", "duration_months:24"]),
            precedent(&[]),
        ]);
        assert_eq!(signal.similar_cases, 4);
        assert_eq!(signal.success_rate, Some(67));
        assert_eq!(signal.timeline, "18-30 months across 3 precedents");
    }

    #[test]
    fn test_untagged_precedents_have_no_rate() {
        let signal = summarize_precedents(&[precedent(&[]), precedent(&["duration_months:abc"])]);
        assert_eq!(signal.similar_cases, 2);
        assert_eq!(signal.success_rate, None);
        assert_eq!(signal.timeline, INSUFFICIENT_HISTORY);
    }

    #[test]
    fn test_single_duration_timeline() {
        let signal = summarize_precedents(&[precedent(&["duration_months:12"])]);
        assert_eq!(signal.timeline, "12 months across 1 precedent(s)");
    }

    #[tokio::test]
    async fn test_historical_agent_attaches_signal() {
        let source = StaticKnowledgeSource::new(vec![CorpusEntry {
            keywords: vec!["precedents".into(), "entry".into()],
            country: Some("Vietnam".into()),
            sector: None,
            text: "Japanese electronics makers entered Vietnam after the 2007 WTO accession".into(),
            provenance: "JETRO survey archive".into(),
            tags: vec!["outcome:success".into(), "duration_months:22".into()],
        }]);
        let request = OrchestrationRequest::builder()
            .profile(OrganizationProfile { country: "Vietnam".into(), ..OrganizationProfile::default() })
            .query("market entry")
            .data_scope(DataScope::Historical)
            .build()
            .unwrap();

        let res = HistoricalAgent::new(Arc::new(source)).analyze(&request).await.unwrap();
        let signal = res.historical_signal.clone().unwrap();
        assert_eq!(res.data_age, 100);
        assert_eq!(signal.similar_cases, 1);
        assert_eq!(signal.success_rate, Some(100));
        assert_eq!(signal.timeline, "22 months across 1 precedent(s)");
        assert!(res.sources.contains(&"JETRO survey archive".to_string()));
    }

    #[tokio::test]
    async fn test_similar_cases_ignore_scope_cap() {
        let entries = (0..6)
            .map(|i| CorpusEntry {
                keywords: vec!["precedents".into()],
                country: None,
                sector: None,
                text: format!("Entrant {} reached break-even", i),
                provenance: "FDI case archive".into(),
                tags: vec!["outcome:success".into(), format!("duration_months:{}", 12 + i)],
            })
            .collect();
        let request = OrchestrationRequest::builder()
            .profile(OrganizationProfile { country: "Vietnam".into(), ..OrganizationProfile::default() })
            .query("market entry")
            .data_scope(DataScope::Recent)
            .build()
            .unwrap();

        let res = HistoricalAgent::new(Arc::new(StaticKnowledgeSource::new(entries)))
            .analyze(&request)
            .await
            .unwrap();
        let signal = res.historical_signal.clone().unwrap();
        assert_eq!(res.findings.len(), 2);
        assert_eq!(signal.similar_cases, 6);
        assert_eq!(signal.timeline, "12-17 months across 6 precedents");
    }
}
