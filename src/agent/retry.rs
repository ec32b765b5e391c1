//! Bounded retry with exponential backoff for knowledge-source calls

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::agent::knowledge::{Evidence, KnowledgeSource};
use crate::agent::{AgentError, AgentResult};
use crate::orchestrator::profile::OrganizationProfile;

const MAX_RETRY_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first call
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_factor: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 200,
            backoff_factor: 2,
            max_backoff_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Attempts actually made, always within 1..=10
    pub fn attempts(&self) -> u32 {
        self.max_attempts.clamp(1, MAX_RETRY_ATTEMPTS)
    }

    /// Delay before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = self.backoff_factor.max(1).saturating_pow(retry);
        let ms = self.initial_backoff_ms.saturating_mul(factor).min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

/// Retrieve evidence, retrying transient failures only
pub async fn retrieve_with_retry(
    source: &dyn KnowledgeSource,
    profile: &OrganizationProfile,
    topic: &str,
    policy: &RetryPolicy,
) -> AgentResult<Vec<Evidence>> {
    let attempts = policy.attempts();
    let mut attempt = 0;
    loop {
        attempt += 1;
        match source.retrieve(profile, topic).await {
            Ok(evidence) => return Ok(evidence),
            Err(e) if e.is_transient() && attempt < attempts => {
                let delay = policy.backoff(attempt - 1);
                warn!("Retrieval for '{}' failed (attempt {}/{}): {}; retrying in {:?}", topic, attempt, attempts, e, delay);
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(AgentError::Retrieval {
                    topic: topic.to_string(),
                    attempts: attempt,
                    message: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::knowledge::SourceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakySource {
        calls: AtomicU32,
        failures_before_success: u32,
        error: SourceError,
    }

    #[async_trait]
    impl KnowledgeSource for FlakySource {
        async fn retrieve(&self, _profile: &OrganizationProfile, _topic: &str) -> Result<Vec<Evidence>, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures_before_success {
                Err(self.error.clone())
            } else {
                Ok(vec![Evidence::new("ok", "flaky", 1.0)])
            }
        }
    }

    fn flaky(failures: u32, error: SourceError) -> FlakySource {
        FlakySource {
            calls: AtomicU32::new(0),
            failures_before_success: failures,
            error,
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(200));
        assert_eq!(policy.backoff(1), Duration::from_millis(400));
        assert_eq!(policy.backoff(2), Duration::from_millis(800));
        assert_eq!(policy.backoff(20), Duration::from_millis(5_000));
    }

    #[test]
    fn test_attempts_are_bounded() {
        let unbounded = RetryPolicy { max_attempts: u32::MAX, ..RetryPolicy::default() };
        assert_eq!(unbounded.attempts(), 10);
        let zero = RetryPolicy { max_attempts: 0, ..RetryPolicy::default() };
        assert_eq!(zero.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_recovers() {
        let source = flaky(2, SourceError::Transient("503".into()));
        let found = retrieve_with_retry(&source, &OrganizationProfile::default(), "topic", &RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhaust() {
        let source = flaky(u32::MAX, SourceError::Transient("429".into()));
        let err = retrieve_with_retry(&source, &OrganizationProfile::default(), "topic", &RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Retrieval { attempts: 3, .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let source = flaky(u32::MAX, SourceError::Permanent("401".into()));
        let err = retrieve_with_retry(&source, &OrganizationProfile::default(), "topic", &RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Retrieval { attempts: 1, .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
