//! Synthesis
//!
//! Deterministic aggregation of agent responses into one analysis.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::agent::{AgentResponse, AgentType, INSUFFICIENT_HISTORY};
use crate::orchestrator::error::{OrchestrationError, OrchestrationResult};
use crate::utils::dedup_preserving_order;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Synthesis {
    pub primary_insight: String,
    pub alternative_viewpoints: Vec<String>,
    pub confidence_level: u8,
    pub data_gaps: Vec<String>,
    pub recommended_next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPatterns {
    pub similar_cases: u32,
    pub success_rate: Option<u8>,
    pub failure_patterns: Vec<String>,
    pub timeline: String,
}

impl HistoricalPatterns {
    /// Values used when no historical response is available
    pub fn insufficient() -> Self {
        Self {
            similar_cases: 0,
            success_rate: None,
            failure_patterns: Vec::new(),
            timeline: INSUFFICIENT_HISTORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedAnalysis {
    pub question: String,
    /// Responses in canonical activation order
    pub agent_responses: Vec<AgentResponse>,
    pub synthesis: Synthesis,
    pub historical_patterns: HistoricalPatterns,
}

pub struct SynthesisEngine;

impl SynthesisEngine {
    /// Merge responses (already in canonical order) into one analysis.
    ///
    /// `failure_gaps` are gaps recorded for agents that produced no response;
    /// they follow the responders' gaps under the same deduplication rule.
    pub fn synthesize(
        question: &str,
        responses: Vec<AgentResponse>,
        failure_gaps: &[String],
    ) -> OrchestrationResult<SynthesizedAnalysis> {
        if responses.is_empty() {
            return Err(OrchestrationError::EmptyAgentSet {
                attempted: failure_gaps.len(),
                gaps: failure_gaps.to_vec(),
            });
        }

        let confidence_level = Self::mean_confidence(&responses);

        let data_gaps = dedup_preserving_order(
            responses
                .iter()
                .flat_map(|r| r.gaps.iter().cloned())
                .chain(failure_gaps.iter().cloned()),
        );
        let recommended_next_steps =
            dedup_preserving_order(responses.iter().flat_map(|r| r.recommendations.iter().cloned()));

        // Stable sort: equal confidences keep canonical order
        let mut ranked: Vec<&AgentResponse> = responses.iter().collect();
        ranked.sort_by_key(|r| Reverse(r.confidence));
        let lead = |r: &AgentResponse| r.findings.first().cloned().unwrap_or_default();
        let primary_insight = lead(ranked[0]);
        let alternative_viewpoints = ranked[1..].iter().map(|r| lead(*r)).collect();

        let historical_patterns = Self::historical_patterns(&responses);

        Ok(SynthesizedAnalysis {
            question: question.to_string(),
            agent_responses: responses,
            synthesis: Synthesis {
                primary_insight,
                alternative_viewpoints,
                confidence_level,
                data_gaps,
                recommended_next_steps,
            },
            historical_patterns,
        })
    }

    /// Arithmetic mean rounded half up, in integer arithmetic
    pub fn mean_confidence(responses: &[AgentResponse]) -> u8 {
        if responses.is_empty() {
            return 0;
        }
        let n = responses.len() as u64;
        let sum: u64 = responses.iter().map(|r| r.confidence.min(100) as u64).sum();
        ((sum * 2 + n) / (n * 2)) as u8
    }

    /// Derived from the historical response only; never fabricated
    pub fn historical_patterns(responses: &[AgentResponse]) -> HistoricalPatterns {
        let Some(historical) = responses.iter().find(|r| r.agent_type == AgentType::Historical) else {
            return HistoricalPatterns::insufficient();
        };

        let failure_patterns =
            dedup_preserving_order(historical.findings.iter().chain(historical.gaps.iter()).cloned());

        match historical.historical_signal {
            Some(ref signal) => HistoricalPatterns {
                similar_cases: signal.similar_cases,
                success_rate: signal.success_rate,
                failure_patterns,
                timeline: signal.timeline.clone(),
            },
            None => HistoricalPatterns {
                failure_patterns,
                ..HistoricalPatterns::insufficient()
            },
        }
    }
}
