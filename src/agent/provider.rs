use async_trait::async_trait;
use serde_json::json;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::agent::knowledge::{rank, Evidence, KnowledgeSource, SourceError};
use crate::orchestrator::profile::OrganizationProfile;

const RETRYABLE_STATUS: &[u16] = &[408, 425, 429, 500, 502, 503, 504];

/// Evidence source backed by an OpenAI-compatible chat-completions endpoint.
/// The model is asked for one `text | provenance | tag, tag` line per item.
pub struct OpenAICompatibleSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAICompatibleSource {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    fn prompt(profile: &OrganizationProfile, topic: &str) -> String {
        format!(
            "List documented evidence about: {}\n\
             Organization: {} ({}), country: {}, sector: {}, revenue band: {}.\n\
             Reply with at most 6 lines, most relevant first, each formatted as\n\
             <evidence sentence> | <source> | <comma separated tags>\n\
             Use tags outcome:success, outcome:failure or duration_months:<n> where known.\n\
             Do not invent sources. Reply NONE if nothing is documented.",
            topic,
            profile.organization_name,
            profile.organization_type,
            profile.country_or_global(),
            profile.primary_sector(),
            profile.revenue_band,
        )
    }

    fn classify(status: StatusCode, body: String) -> SourceError {
        if RETRYABLE_STATUS.contains(&status.as_u16()) {
            SourceError::Transient(format!("HTTP {}: {}", status, body))
        } else {
            SourceError::Permanent(format!("HTTP {}: {}", status, body))
        }
    }
}

/// Parse `text | provenance | tags` lines into ranked evidence
pub fn parse_evidence_lines(content: &str) -> Vec<Evidence> {
    let lines = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.eq_ignore_ascii_case("none"));

    let evidence = lines
        .filter_map(|line| {
            let mut parts = line.splitn(3, '|').map(str::trim);
            let text = parts.next().filter(|t| !t.is_empty())?;
            let provenance = parts.next().filter(|p| !p.is_empty())?;
            let tags: Vec<String> = parts
                .next()
                .map(|t| t.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect())
                .unwrap_or_default();
            let text = text.trim_start_matches(|c: char| c == '-' || c == '*' || c.is_whitespace());
            Some((text.to_string(), provenance.to_string(), tags))
        })
        .enumerate()
        .map(|(i, (text, provenance, tags))| {
            let score = (1.0 - i as f32 * 0.1).max(0.1);
            Evidence::new(text, provenance, score).with_tags(tags)
        })
        .collect();

    rank(evidence)
}

#[async_trait]
impl KnowledgeSource for OpenAICompatibleSource {
    async fn retrieve(&self, profile: &OrganizationProfile, topic: &str) -> Result<Vec<Evidence>, SourceError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": "You are a research librarian. You only cite documented evidence." },
                { "role": "user", "content": Self::prompt(profile, topic) },
            ],
            "temperature": 0.0,
        });

        let mut request = self.client.post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .json(&body);

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                SourceError::Transient(e.to_string())
            } else {
                SourceError::Permanent(e.to_string())
            }
        })?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(Self::classify(status, text));
        }

        let json: serde_json::Value = res.json().await.map_err(|e| SourceError::Malformed(e.to_string()))?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| SourceError::Malformed("missing choices[0].message.content".to_string()))?;

        let evidence = parse_evidence_lines(content);
        debug!("Model {} returned {} evidence lines for '{}'", self.model, evidence.len(), topic);
        Ok(evidence)
    }
}
