use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use anyhow::{Context, Result};
use tokio::fs;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

/// Snapshot of the requesting organization and its strategic parameters.
/// Supplied by the configuration layer; read-only to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationProfile {
    pub organization_name: String,
    pub organization_type: String,
    pub region: String,
    pub country: String,
    pub industry: Vec<String>,
    pub revenue_band: String,
    pub risk_tolerance: RiskTolerance,
    pub strategic_intent: String,
    pub expansion_timeline: String,
    pub analysis_timeframe: String,
}

impl Default for OrganizationProfile {
    fn default() -> Self {
        Self {
            organization_name: String::new(),
            organization_type: "Private Enterprise".to_string(),
            region: String::new(),
            country: String::new(),
            industry: Vec::new(),
            revenue_band: "Mid-market".to_string(),
            risk_tolerance: RiskTolerance::Medium,
            strategic_intent: String::new(),
            expansion_timeline: "1-2 Years".to_string(),
            analysis_timeframe: "12 months".to_string(),
        }
    }
}

impl OrganizationProfile {
    pub fn country_or_global(&self) -> &str {
        match self.country.trim() {
            "" => "global",
            c => c,
        }
    }

    /// First declared industry, trimmed of sub-sector qualifiers ("Energy & Utilities" -> "Energy")
    pub fn primary_sector(&self) -> &str {
        self.industry
            .first()
            .and_then(|i| i.split('&').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("cross-sector")
    }
}

pub struct ProfileManager {
    path: PathBuf,
}

impl ProfileManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<OrganizationProfile> {
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read profile {}", self.path.display()))?;
        let profile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse profile {}", self.path.display()))?;
        Ok(profile)
    }

    pub async fn save(&self, profile: &OrganizationProfile) -> Result<()> {
        let content = serde_json::to_string_pretty(profile)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}
