//! Evidence Cache
//!
//! In-memory cache of knowledge-source replies so repeated topics within and
//! across runs do not hit the backend again.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use sha2::{Sha256, Digest};
use async_trait::async_trait;

use crate::agent::knowledge::{Evidence, KnowledgeSource, SourceError};
use crate::orchestrator::profile::OrganizationProfile;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    profile_hash: [u8; 32],
    topic_hash: [u8; 32],
}

impl CacheKey {
    fn new(profile: &OrganizationProfile, topic: &str) -> Self {
        let profile_json = serde_json::to_string(profile).unwrap_or_default();
        Self {
            profile_hash: hash(&profile_json),
            topic_hash: hash(topic),
        }
    }
}

fn hash(text: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}

pub struct EvidenceCache {
    entries: Arc<RwLock<HashMap<CacheKey, Vec<Evidence>>>>,
}

impl EvidenceCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, profile: &OrganizationProfile, topic: &str) -> Option<Vec<Evidence>> {
        let entries = self.entries.read().await;
        entries.get(&CacheKey::new(profile, topic)).cloned()
    }

    pub async fn set(&self, profile: &OrganizationProfile, topic: &str, evidence: Vec<Evidence>) {
        let mut entries = self.entries.write().await;
        entries.insert(CacheKey::new(profile, topic), evidence);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Default for EvidenceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Source that wraps another source with a cache. Failures are never cached.
pub struct CachedSource {
    inner: Arc<dyn KnowledgeSource>,
    cache: Arc<EvidenceCache>,
}

impl CachedSource {
    pub fn new(inner: Arc<dyn KnowledgeSource>, cache: Arc<EvidenceCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl KnowledgeSource for CachedSource {
    async fn retrieve(&self, profile: &OrganizationProfile, topic: &str) -> Result<Vec<Evidence>, SourceError> {
        if let Some(cached) = self.cache.get(profile, topic).await {
            tracing::debug!("Evidence cache hit for topic '{}'", topic);
            return Ok(cached);
        }

        let evidence = self.inner.retrieve(profile, topic).await?;
        self.cache.set(profile, topic, evidence.clone()).await;
        Ok(evidence)
    }
}
