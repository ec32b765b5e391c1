use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::orchestrator::error::OrchestrationError;
use crate::orchestrator::profile::OrganizationProfile;

/// Types of domain-specialist agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Historical,
    Government,
    Banking,
    Corporate,
    Market,
    Risk,
    Custom,
}

/// Agents activated when a request does not name any, in canonical order.
/// `Custom` is appended only when the request opts into custom data.
pub const DEFAULT_ACTIVATION: [AgentType; 6] = [
    AgentType::Historical,
    AgentType::Government,
    AgentType::Banking,
    AgentType::Corporate,
    AgentType::Market,
    AgentType::Risk,
];

impl AgentType {
    pub const ALL: [AgentType; 7] = [
        AgentType::Historical,
        AgentType::Government,
        AgentType::Banking,
        AgentType::Corporate,
        AgentType::Market,
        AgentType::Risk,
        AgentType::Custom,
    ];

    /// Wire tag used in requests, gaps and logs
    pub fn tag(&self) -> &'static str {
        match self {
            AgentType::Historical => "historical",
            AgentType::Government => "government",
            AgentType::Banking => "banking",
            AgentType::Corporate => "corporate",
            AgentType::Market => "market",
            AgentType::Risk => "risk",
            AgentType::Custom => "custom",
        }
    }

    /// What this agent type knows and how far back its data reaches
    pub fn brief(&self) -> DomainBrief {
        match self {
            AgentType::Historical => DomainBrief {
                baseline_confidence: 85,
                data_age: 100,
                sources: &[
                    "World Bank historical archives (1924-present)",
                    "National government records",
                    "Corporate annual report archives",
                ],
                standing_gaps: &[
                    "Specific company financial data pre-1980",
                    "Government incentive details before 1995",
                ],
            },
            AgentType::Government => DomainBrief {
                baseline_confidence: 90,
                data_age: 15,
                sources: &[
                    "Government trade and investment ministry records",
                    "Tax treaty archives",
                ],
                standing_gaps: &[
                    "Real-time government budget changes",
                    "Unofficial incentive practices",
                ],
            },
            AgentType::Banking => DomainBrief {
                baseline_confidence: 75,
                data_age: 10,
                sources: &[
                    "Central bank records",
                    "Development bank historical loans",
                ],
                standing_gaps: &["Real-time interest rates", "Confidential loan terms"],
            },
            AgentType::Corporate => DomainBrief {
                baseline_confidence: 80,
                data_age: 20,
                sources: &["Corporate annual reports", "M&A transaction data"],
                standing_gaps: &[
                    "Proprietary business strategies",
                    "Confidential financial terms",
                ],
            },
            AgentType::Market => DomainBrief {
                baseline_confidence: 70,
                data_age: 5,
                sources: &["Industry reports", "Market research databases"],
                standing_gaps: &[
                    "Real-time competitive pricing",
                    "Undisclosed market strategies",
                ],
            },
            AgentType::Risk => DomainBrief {
                baseline_confidence: 65,
                data_age: 30,
                sources: &[
                    "Corporate failure case studies",
                    "Geopolitical event databases",
                ],
                standing_gaps: &[
                    "Classified political intelligence",
                    "Proprietary risk models",
                ],
            },
            AgentType::Custom => DomainBrief {
                baseline_confidence: 60,
                data_age: 0,
                sources: &["User-provided data"],
                standing_gaps: &[
                    "Verification of custom data",
                    "Historical context for custom insights",
                ],
            },
        }
    }

    /// Research topics this agent asks its knowledge source about
    pub fn topics(&self, profile: &OrganizationProfile, query: &str) -> Vec<String> {
        let country = profile.country_or_global();
        let sector = profile.primary_sector();
        match self {
            AgentType::Historical => vec![
                format!("{} precedents in {} {}", query, country, sector),
                format!("{} economic cycles and policy shifts", country),
            ],
            AgentType::Government => vec![
                format!("{} investment incentives for {}", country, sector),
                format!("{} regulatory framework and policy stability", country),
            ],
            AgentType::Banking => vec![
                format!("{} financing terms for {} {}", country, profile.revenue_band, sector),
                format!("{} currency and credit conditions", country),
            ],
            AgentType::Corporate => vec![
                format!("{} organizations {} in {}", profile.revenue_band, query, country),
                format!("{} partnerships and expansion strategies", sector),
            ],
            AgentType::Market => vec![
                format!("{} market size and competition in {}", sector, country),
                format!("{} entry barriers in {}", sector, country),
            ],
            AgentType::Risk => vec![
                format!("{} investment failures in {}", sector, country),
                format!("{} political and currency risk", country),
            ],
            AgentType::Custom => vec![query.to_string()],
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for AgentType {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentType::ALL
            .iter()
            .find(|t| t.tag() == s)
            .copied()
            .ok_or_else(|| OrchestrationError::InvalidAgentType(s.to_string()))
    }
}

/// Static description of a domain: data-source reliability and coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainBrief {
    /// Self-reported reliability of the domain's data sources (0-100)
    pub baseline_confidence: u8,
    /// Years of coverage the domain's data reflects
    pub data_age: u32,
    pub sources: &'static [&'static str],
    /// Blind spots the domain always carries
    pub standing_gaps: &'static [&'static str],
}
