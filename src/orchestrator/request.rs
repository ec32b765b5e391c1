//! Orchestration requests
//!
//! `RawOrchestrationRequest` is the loosely-typed shape the presentation layer
//! sends; `OrchestrationRequest` is the validated, immutable form the
//! orchestrator runs. Validation happens once, before any agent is activated.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::agent::AgentType;
use crate::orchestrator::error::{OrchestrationError, OrchestrationResult};
use crate::orchestrator::profile::OrganizationProfile;

/// Time range the analysis should cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataScope {
    Recent,
    #[default]
    Comprehensive,
    Historical,
}

impl DataScope {
    /// Evidence items an agent keeps per research topic
    pub fn evidence_per_topic(&self) -> usize {
        match self {
            DataScope::Recent => 2,
            DataScope::Comprehensive => 3,
            DataScope::Historical => 4,
        }
    }

    /// Clamp a domain's coverage window to this scope
    pub fn data_age(&self, domain_years: u32) -> u32 {
        match self {
            DataScope::Recent => domain_years.min(5),
            DataScope::Comprehensive | DataScope::Historical => domain_years,
        }
    }
}

impl FromStr for DataScope {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(DataScope::Recent),
            "comprehensive" => Ok(DataScope::Comprehensive),
            "historical" => Ok(DataScope::Historical),
            other => Err(OrchestrationError::InvalidRequest(format!(
                "dataScope must be one of recent, comprehensive, historical (got '{}')",
                other
            ))),
        }
    }
}

/// User-supplied data routed to the custom agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomDataRecord {
    Metric {
        name: String,
        value: f64,
        #[serde(default)]
        unit: Option<String>,
        source: String,
    },
    Observation {
        statement: String,
        source: String,
    },
    Document {
        title: String,
        excerpt: String,
        source: String,
    },
}

impl CustomDataRecord {
    pub fn source(&self) -> &str {
        match self {
            CustomDataRecord::Metric { source, .. }
            | CustomDataRecord::Observation { source, .. }
            | CustomDataRecord::Document { source, .. } => source,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CustomDataRecord::Metric { .. } => "metric",
            CustomDataRecord::Observation { .. } => "observation",
            CustomDataRecord::Document { .. } => "document",
        }
    }

    /// Human-readable statement of the record
    pub fn statement(&self) -> String {
        match self {
            CustomDataRecord::Metric { name, value, unit, .. } => match unit {
                Some(unit) => format!("{} = {} {}", name, value, unit),
                None => format!("{} = {}", name, value),
            },
            CustomDataRecord::Observation { statement, .. } => statement.clone(),
            CustomDataRecord::Document { title, excerpt, .. } => format!("{}: {}", title, excerpt),
        }
    }

    pub fn validate(&self) -> OrchestrationResult<()> {
        let blank = |field: &str| {
            OrchestrationError::InvalidRequest(format!("custom {} record has an empty {}", self.kind(), field))
        };
        if self.source().trim().is_empty() {
            return Err(blank("source"));
        }
        match self {
            CustomDataRecord::Metric { name, value, .. } => {
                if name.trim().is_empty() {
                    return Err(blank("name"));
                }
                if !value.is_finite() {
                    return Err(OrchestrationError::InvalidRequest(format!(
                        "custom metric '{}' is not a finite number",
                        name
                    )));
                }
            }
            CustomDataRecord::Observation { statement, .. } => {
                if statement.trim().is_empty() {
                    return Err(blank("statement"));
                }
            }
            CustomDataRecord::Document { title, excerpt, .. } => {
                if title.trim().is_empty() {
                    return Err(blank("title"));
                }
                if excerpt.trim().is_empty() {
                    return Err(blank("excerpt"));
                }
            }
        }
        Ok(())
    }
}

/// Wire shape supplied by the configuration layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOrchestrationRequest {
    pub organization_profile: Option<OrganizationProfile>,
    pub query: String,
    pub data_scope: String,
    pub include_custom_data: bool,
    pub agents_to_activate: Option<Vec<String>>,
    pub custom_data: Vec<CustomDataRecord>,
}

/// A validated orchestration request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationRequest {
    profile: OrganizationProfile,
    query: String,
    data_scope: DataScope,
    include_custom_data: bool,
    agents_to_activate: Option<Vec<AgentType>>,
    custom_data: Vec<CustomDataRecord>,
}

impl OrchestrationRequest {
    pub fn builder() -> OrchestrationRequestBuilder {
        OrchestrationRequestBuilder::default()
    }

    pub fn profile(&self) -> &OrganizationProfile {
        &self.profile
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn data_scope(&self) -> DataScope {
        self.data_scope
    }

    pub fn include_custom_data(&self) -> bool {
        self.include_custom_data
    }

    /// Explicit activation list, if the caller supplied one
    pub fn agents_to_activate(&self) -> Option<&[AgentType]> {
        self.agents_to_activate.as_deref()
    }

    pub fn custom_data(&self) -> &[CustomDataRecord] {
        &self.custom_data
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrchestrationRequestBuilder {
    profile: Option<OrganizationProfile>,
    query: String,
    data_scope: DataScope,
    include_custom_data: bool,
    agents_to_activate: Option<Vec<AgentType>>,
    custom_data: Vec<CustomDataRecord>,
}

impl OrchestrationRequestBuilder {
    pub fn profile(mut self, profile: OrganizationProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn data_scope(mut self, scope: DataScope) -> Self {
        self.data_scope = scope;
        self
    }

    pub fn include_custom_data(mut self, include: bool) -> Self {
        self.include_custom_data = include;
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = AgentType>) -> Self {
        self.agents_to_activate = Some(agents.into_iter().collect());
        self
    }

    pub fn custom_data(mut self, records: Vec<CustomDataRecord>) -> Self {
        self.custom_data = records;
        self
    }

    pub fn build(self) -> OrchestrationResult<OrchestrationRequest> {
        let profile = self
            .profile
            .ok_or_else(|| OrchestrationError::InvalidRequest("organizationProfile is required".to_string()))?;

        let query = self.query.trim().to_string();
        if query.is_empty() {
            return Err(OrchestrationError::InvalidRequest("query must not be empty".to_string()));
        }

        for record in &self.custom_data {
            record.validate()?;
        }

        let agents_to_activate = match self.agents_to_activate {
            Some(agents) if agents.is_empty() => {
                return Err(OrchestrationError::InvalidRequest(
                    "agentsToActivate must not be empty when supplied".to_string(),
                ))
            }
            Some(agents) => {
                let mut unique = Vec::with_capacity(agents.len());
                for agent in agents {
                    if !unique.contains(&agent) {
                        unique.push(agent);
                    }
                }
                Some(unique)
            }
            None => None,
        };

        Ok(OrchestrationRequest {
            profile,
            query,
            data_scope: self.data_scope,
            include_custom_data: self.include_custom_data,
            agents_to_activate,
            custom_data: self.custom_data,
        })
    }
}

impl TryFrom<RawOrchestrationRequest> for OrchestrationRequest {
    type Error = OrchestrationError;

    fn try_from(raw: RawOrchestrationRequest) -> OrchestrationResult<Self> {
        let mut builder = OrchestrationRequest::builder()
            .query(raw.query)
            .include_custom_data(raw.include_custom_data)
            .custom_data(raw.custom_data);
        if let Some(profile) = raw.organization_profile {
            builder = builder.profile(profile);
        }

        if builder.profile.is_none() {
            return Err(OrchestrationError::InvalidRequest("organizationProfile is required".to_string()));
        }
        if builder.query.trim().is_empty() {
            return Err(OrchestrationError::InvalidRequest("query must not be empty".to_string()));
        }
        builder = builder.data_scope(raw.data_scope.parse()?);

        // Request-shape problems are reported before unknown agent tags
        for record in &builder.custom_data {
            record.validate()?;
        }

        if let Some(tags) = raw.agents_to_activate {
            if tags.is_empty() {
                return Err(OrchestrationError::InvalidRequest(
                    "agentsToActivate must not be empty when supplied".to_string(),
                ));
            }
            let agents = tags
                .iter()
                .map(|t| t.parse::<AgentType>())
                .collect::<OrchestrationResult<Vec<_>>>()?;
            builder = builder.agents(agents);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawOrchestrationRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_raw_request_parses_and_validates() {
        let req = OrchestrationRequest::try_from(raw(
            r#"{
                "organizationProfile": {"country": "Vietnam"},
                "query": "  market entry ",
                "dataScope": "recent",
                "includeCustomData": false,
                "agentsToActivate": ["government", "banking"]
            }"#,
        ))
        .unwrap();
        assert_eq!(req.query(), "market entry");
        assert_eq!(req.data_scope(), DataScope::Recent);
        assert_eq!(req.agents_to_activate(), Some(&[AgentType::Government, AgentType::Banking][..]));
        assert_eq!(req.profile().country, "Vietnam");
    }

    #[test]
    fn test_missing_profile_is_invalid_request() {
        let err = OrchestrationRequest::try_from(raw(r#"{"query": "q", "dataScope": "recent"}"#)).unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidRequest(_)));
    }

    #[test]
    fn test_blank_query_is_invalid_request() {
        let err = OrchestrationRequest::builder()
            .profile(OrganizationProfile::default())
            .query("   ")
            .build()
            .unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidRequest(_)));
    }

    #[test]
    fn test_unknown_scope_is_invalid_request() {
        let err = OrchestrationRequest::try_from(raw(
            r#"{"organizationProfile": {}, "query": "q", "dataScope": "forever"}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidRequest(ref m) if m.contains("forever")));
    }

    #[test]
    fn test_unknown_agent_tag_is_invalid_agent_type() {
        let err = OrchestrationRequest::try_from(raw(
            r#"{"organizationProfile": {}, "query": "q", "dataScope": "recent", "agentsToActivate": ["risk", "oracle"]}"#,
        ))
        .unwrap_err();
        assert_eq!(err, OrchestrationError::InvalidAgentType("oracle".to_string()));
    }

    #[test]
    fn test_bad_scope_reported_before_bad_tag() {
        let err = OrchestrationRequest::try_from(raw(
            r#"{"organizationProfile": {}, "query": "q", "dataScope": "x", "agentsToActivate": ["oracle"]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidRequest(_)));
    }

    #[test]
    fn test_duplicate_tags_collapse_in_first_seen_order() {
        let req = OrchestrationRequest::builder()
            .profile(OrganizationProfile::default())
            .query("q")
            .agents([AgentType::Risk, AgentType::Historical, AgentType::Risk])
            .build()
            .unwrap();
        assert_eq!(req.agents_to_activate(), Some(&[AgentType::Risk, AgentType::Historical][..]));
    }

    #[test]
    fn test_empty_activation_list_is_invalid_request() {
        let err = OrchestrationRequest::builder()
            .profile(OrganizationProfile::default())
            .query("q")
            .agents([])
            .build()
            .unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidRequest(_)));
    }

    #[test]
    fn test_custom_records_are_schema_checked() {
        let records: Vec<CustomDataRecord> = serde_json::from_str(
            r#"[
                {"kind": "metric", "name": "plant utilisation", "value": 0.82, "unit": "ratio", "source": "ops dashboard"},
                {"kind": "observation", "statement": "Distributor prefers USD invoicing", "source": "site visit"}
            ]"#,
        )
        .unwrap();
        assert_eq!(records[0].statement(), "plant utilisation = 0.82 ratio");

        let ok = OrchestrationRequest::builder()
            .profile(OrganizationProfile::default())
            .query("q")
            .custom_data(records)
            .build();
        assert!(ok.is_ok());

        let bad = OrchestrationRequest::builder()
            .profile(OrganizationProfile::default())
            .query("q")
            .custom_data(vec![CustomDataRecord::Observation { statement: "x".into(), source: " ".into() }])
            .build();
        assert!(matches!(bad, Err(OrchestrationError::InvalidRequest(_))));
    }

    #[test]
    fn test_untagged_custom_blob_is_rejected_by_schema() {
        let parsed = serde_json::from_str::<Vec<CustomDataRecord>>(r#"[{"anything": 1}]"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_scope_shapes_coverage() {
        assert_eq!(DataScope::Recent.data_age(100), 5);
        assert_eq!(DataScope::Historical.data_age(100), 100);
        assert_eq!(DataScope::Comprehensive.evidence_per_topic(), 3);
    }
}
