//! Orchestrator configuration
//!
//! Defaults, optionally overlaid by a YAML/JSON file and `AGENCY_*`
//! environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::agent::RetryPolicy;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Deadline for each agent invocation
    pub agent_timeout_ms: u64,
    /// Upper bound on agents running at once
    pub max_concurrent_agents: usize,
    pub retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agent_timeout_ms: 30_000,
            max_concurrent_agents: 4,
            retry: RetryPolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_millis(self.agent_timeout_ms)
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout_ms = saturating_millis(timeout);
        self
    }

    pub fn with_max_concurrent_agents(mut self, limit: usize) -> Self {
        self.max_concurrent_agents = limit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Apply `AGENCY_*` overrides from any key lookup; unparsable values are ignored
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
            let value = value?;
            match value.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring {}={:?}: not a valid number", key, value);
                    None
                }
            }
        }

        if let Some(ms) = parse("AGENCY_AGENT_TIMEOUT_MS", lookup("AGENCY_AGENT_TIMEOUT_MS")) {
            self.agent_timeout_ms = ms;
        }
        if let Some(n) = parse("AGENCY_MAX_CONCURRENT_AGENTS", lookup("AGENCY_MAX_CONCURRENT_AGENTS")) {
            self.max_concurrent_agents = n;
        }
        if let Some(n) = parse("AGENCY_RETRY_ATTEMPTS", lookup("AGENCY_RETRY_ATTEMPTS")) {
            self.retry.max_attempts = n;
        }
        if let Some(ms) = parse("AGENCY_RETRY_BACKOFF_MS", lookup("AGENCY_RETRY_BACKOFF_MS")) {
            self.retry.initial_backoff_ms = ms;
        }
        self
    }
}
