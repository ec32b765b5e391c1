//! Custom Data Integration Agent
//!
//! Puts user-provided records behind the same `KnowledgeSource` contract as
//! every other domain, so the custom agent runs the common research path.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::agent::knowledge::{rank, tokenize, Evidence, KnowledgeSource, SourceError};
use crate::agent::retry::{retrieve_with_retry, RetryPolicy};
use crate::agent::specialist::{gather, respond};
use crate::agent::{AgentResponse, AgentResult, AgentType, DomainAgent};
use crate::orchestrator::profile::OrganizationProfile;
use crate::orchestrator::request::{CustomDataRecord, OrchestrationRequest};

/// Knowledge source over a request's custom-data records.
/// Every record is returned; records sharing terms with the topic rank first.
pub struct RecordSource<'a> {
    records: &'a [CustomDataRecord],
}

impl<'a> RecordSource<'a> {
    pub fn new(records: &'a [CustomDataRecord]) -> Self {
        Self { records }
    }
}

#[async_trait]
impl KnowledgeSource for RecordSource<'_> {
    async fn retrieve(&self, _profile: &OrganizationProfile, topic: &str) -> Result<Vec<Evidence>, SourceError> {
        let terms = tokenize(topic);
        let evidence = self
            .records
            .iter()
            .map(|record| {
                let statement = record.statement();
                let overlap = tokenize(&statement).intersection(&terms).count();
                Evidence::new(statement, record.source(), 1.0 + overlap as f32)
                    .with_tags(["custom".to_string(), format!("kind:{}", record.kind())])
            })
            .collect();
        Ok(rank(evidence))
    }
}

pub struct CustomDataAgent {
    /// Shared source used to put user data in independent context
    corroboration: Option<Arc<dyn KnowledgeSource>>,
    retry: RetryPolicy,
}

impl CustomDataAgent {
    pub fn new() -> Self {
        Self {
            corroboration: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_corroboration(mut self, source: Arc<dyn KnowledgeSource>) -> Self {
        self.corroboration = Some(source);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for CustomDataAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainAgent for CustomDataAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Custom
    }

    async fn analyze(&self, request: &OrchestrationRequest) -> AgentResult<AgentResponse> {
        let records = RecordSource::new(request.custom_data());
        let topics = AgentType::Custom.topics(request.profile(), request.query());
        let gathered = gather(
            &records,
            &self.retry,
            request.profile(),
            &topics,
            request.custom_data().len().max(1),
        )
        .await?;

        let mut response = respond(AgentType::Custom, request, &gathered);

        if let Some(ref source) = self.corroboration {
            let topic = format!("{} independent validation", request.query());
            match retrieve_with_retry(source.as_ref(), request.profile(), &topic, &self.retry).await {
                Ok(found) => match found.into_iter().next() {
                    Some(ev) => {
                        response.findings.push(format!("Independent context: {}", ev.text));
                        if !response.sources.contains(&ev.provenance) {
                            response.sources.push(ev.provenance);
                        }
                    }
                    None => response.gaps.push("No independent corroboration retrieved".to_string()),
                },
                Err(e) => {
                    debug!("Corroboration lookup failed: {}", e);
                    response.gaps.push(e.to_string());
                }
            }
        }

        Ok(response)
    }
}
