use serde::{Deserialize, Serialize};

use crate::agent::{AgentError, AgentResult, AgentType};

/// Structured output every domain agent produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub agent_type: AgentType,
    /// Self-reported reliability, 0-100
    pub confidence: u8,
    pub sources: Vec<String>,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
    /// Years of historical coverage the data reflects
    pub data_age: u32,
    /// Known blind spots
    pub gaps: Vec<String>,
    /// Precedent statistics, supplied by the historical agent only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_signal: Option<HistoricalSignal>,
}

/// Precedent statistics the historical agent attaches to its response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSignal {
    /// Distinct precedents retrieved, independent of the data scope's per-topic cap
    pub similar_cases: u32,
    pub success_rate: Option<u8>,
    pub timeline: String,
}

impl AgentResponse {
    /// Start a response carrying the domain's baseline confidence and coverage
    pub fn for_agent(agent_type: AgentType) -> Self {
        let brief = agent_type.brief();
        Self {
            agent_type,
            confidence: brief.baseline_confidence,
            sources: brief.sources.iter().map(|s| s.to_string()).collect(),
            findings: Vec::new(),
            recommendations: Vec::new(),
            data_age: brief.data_age,
            gaps: brief.standing_gaps.iter().map(|s| s.to_string()).collect(),
            historical_signal: None,
        }
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_findings<I, S>(mut self, findings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.findings = findings.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recommendations<I, S>(mut self, recommendations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommendations = recommendations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_gaps<I, S>(mut self, gaps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gaps = gaps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data_age(mut self, years: u32) -> Self {
        self.data_age = years;
        self
    }

    pub fn with_historical_signal(mut self, signal: HistoricalSignal) -> Self {
        self.historical_signal = Some(signal);
        self
    }

    /// Check the response contract for the agent slot it was produced in
    pub fn validate(&self, expected: AgentType) -> AgentResult<()> {
        if self.agent_type != expected {
            return Err(AgentError::InvalidResponse(format!(
                "expected a {} response, got {}",
                expected, self.agent_type
            )));
        }
        if self.confidence > 100 {
            return Err(AgentError::InvalidResponse(format!(
                "confidence {} is outside 0-100",
                self.confidence
            )));
        }
        if self.findings.iter().all(|f| f.trim().is_empty()) {
            return Err(AgentError::NoFindings);
        }
        if let Some(rate) = self.historical_signal.as_ref().and_then(|s| s.success_rate) {
            if rate > 100 {
                return Err(AgentError::InvalidResponse(format!(
                    "success rate {} is outside 0-100",
                    rate
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_agent_uses_brief() {
        let res = AgentResponse::for_agent(AgentType::Government);
        assert_eq!(res.confidence, 90);
        assert_eq!(res.data_age, 15);
        assert!(res.gaps.contains(&"Unofficial incentive practices".to_string()));
    }

    #[test]
    fn test_validate_rejects_empty_findings() {
        let res = AgentResponse::for_agent(AgentType::Market);
        assert_eq!(res.validate(AgentType::Market), Err(AgentError::NoFindings));

        let blank = res.with_findings(["  "]);
        assert_eq!(blank.validate(AgentType::Market), Err(AgentError::NoFindings));
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        let res = AgentResponse::for_agent(AgentType::Risk)
            .with_findings(["Currency collapse in 1997"])
            .with_confidence(101);
        assert!(matches!(res.validate(AgentType::Risk), Err(AgentError::InvalidResponse(_))));
    }

    #[test]
    fn test_validate_rejects_wrong_slot() {
        let res = AgentResponse::for_agent(AgentType::Risk).with_findings(["x"]);
        assert!(matches!(res.validate(AgentType::Banking), Err(AgentError::InvalidResponse(_))));
    }

    #[test]
    fn test_camel_case_wire_shape() {
        let res = AgentResponse::for_agent(AgentType::Banking).with_findings(["Rates ranged 6-9%"]);
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["agentType"], "banking");
        assert_eq!(json["dataAge"], 10);
        assert!(json.get("historicalSignal").is_none());
    }
}
