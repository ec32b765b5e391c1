//! Knowledge Sources
//!
//! The retrieval collaborator each agent depends on: given a profile and a
//! topic, return ranked textual evidence with provenance.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::orchestrator::profile::OrganizationProfile;

/// One ranked piece of evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub text: String,
    /// Where the evidence came from
    pub provenance: String,
    /// Structured hints such as `outcome:success` or `duration_months:18`
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub score: f32,
}

impl Evidence {
    pub fn new(text: impl Into<String>, provenance: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            provenance: provenance.into(),
            tags: Vec::new(),
            score,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Value of the first `key:value` tag with this key
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.iter().find_map(|t| {
            t.split_once(':')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v.trim())
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Worth retrying: timeouts, throttling, unavailable backends
    #[error("transient source failure: {0}")]
    Transient(String),

    #[error("source failure: {0}")]
    Permanent(String),

    #[error("malformed source reply: {0}")]
    Malformed(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Return evidence for `topic`, best first
    async fn retrieve(&self, profile: &OrganizationProfile, topic: &str) -> Result<Vec<Evidence>, SourceError>;
}

/// Sort by descending score, keeping retrieval order for ties
pub fn rank(mut evidence: Vec<Evidence>) -> Vec<Evidence> {
    evidence.sort_by(|a, b| b.score.total_cmp(&a.score));
    evidence
}

pub(crate) fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

/// A corpus entry for the static source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    pub text: String,
    pub provenance: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// In-memory evidence corpus, scored by keyword overlap with the topic
#[derive(Debug, Clone, Default)]
pub struct StaticKnowledgeSource {
    entries: Vec<CorpusEntry>,
}

impl StaticKnowledgeSource {
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    /// Load a YAML (or JSON) list of corpus entries
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus {}", path.display()))?;
        let entries: Vec<CorpusEntry> = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse corpus {}", path.display()))?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn score(&self, entry: &CorpusEntry, topic_terms: &HashSet<String>, profile: &OrganizationProfile) -> f32 {
        let hits = entry
            .keywords
            .iter()
            .filter(|k| topic_terms.contains(&k.to_lowercase()))
            .count();
        if hits == 0 {
            return 0.0;
        }
        let mut score = hits as f32 / entry.keywords.len().max(1) as f32;
        if let Some(ref sector) = entry.sector {
            if sector.eq_ignore_ascii_case(profile.primary_sector()) {
                score += 0.5;
            }
        }
        score
    }
}

#[async_trait]
impl KnowledgeSource for StaticKnowledgeSource {
    async fn retrieve(&self, profile: &OrganizationProfile, topic: &str) -> Result<Vec<Evidence>, SourceError> {
        let terms = tokenize(topic);
        let evidence = self
            .entries
            .iter()
            .filter(|e| {
                e.country
                    .as_deref()
                    .map_or(true, |c| c.eq_ignore_ascii_case(profile.country.trim()))
            })
            .filter_map(|e| {
                let score = self.score(e, &terms, profile);
                (score > 0.0).then(|| {
                    Evidence::new(e.text.clone(), e.provenance.clone(), score).with_tags(e.tags.clone())
                })
            })
            .collect::<Vec<_>>();

        debug!("Static corpus matched {} entries for topic '{}'", evidence.len(), topic);
        Ok(rank(evidence))
    }
}
