//! Agency Synthesis CLI
//!
//! Reads an orchestration request (JSON), runs it against the configured
//! evidence source and prints the synthesized analysis as JSON.
//!
//! Usage: `agency_synthesis <request.json> [config.yaml]`

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use agency_synthesis::agent::knowledge::CorpusEntry;
use agency_synthesis::agent::{
    AgentRegistry, CachedSource, EvidenceCache, KnowledgeSource, OpenAICompatibleSource, StaticKnowledgeSource,
};
use agency_synthesis::{OrchestrationRequest, OrchestratorConfig, Orchestrator, RawOrchestrationRequest};

const BUILTIN_CORPUS: &str = include_str!("../demos/corpus.yaml");

fn knowledge_source() -> Result<Arc<dyn KnowledgeSource>> {
    if let Ok(url) = std::env::var("AGENCY_LLM_URL") {
        let model = std::env::var("AGENCY_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        info!("Using OpenAI-compatible evidence source at {} ({})", url, model);
        let api_key = std::env::var("AGENCY_LLM_API_KEY").ok();
        return Ok(Arc::new(OpenAICompatibleSource::new(url, model, api_key)));
    }

    let corpus = match std::env::var("AGENCY_CORPUS") {
        Ok(path) => StaticKnowledgeSource::from_file(&path)?,
        Err(_) => {
            let entries: Vec<CorpusEntry> =
                serde_yaml::from_str(BUILTIN_CORPUS).context("Failed to parse built-in corpus")?;
            StaticKnowledgeSource::new(entries)
        }
    };
    info!("Using static evidence corpus ({} entries)", corpus.len());
    Ok(Arc::new(corpus))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agency_synthesis=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let request_path = args
        .next()
        .context("Usage: agency_synthesis <request.json> [config.yaml]")?;

    let config = match args.next() {
        Some(path) => OrchestratorConfig::from_file(&path)?.overlay(|key| std::env::var(key).ok()),
        None => OrchestratorConfig::from_env(),
    };

    let content = tokio::fs::read_to_string(&request_path)
        .await
        .with_context(|| format!("Failed to read request {}", request_path))?;
    let raw: RawOrchestrationRequest =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse request {}", request_path))?;

    let source: Arc<dyn KnowledgeSource> =
        Arc::new(CachedSource::new(knowledge_source()?, Arc::new(EvidenceCache::new())));
    let registry = AgentRegistry::standard(source, config.retry.clone());
    let orchestrator = Orchestrator::with_config(registry, config);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            trigger.cancel();
        }
    });

    let request = OrchestrationRequest::try_from(raw)?;
    let analysis = orchestrator.run_with_cancellation(request, cancel).await?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
