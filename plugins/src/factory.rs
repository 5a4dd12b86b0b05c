use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use dossier_core::config::{AppConfig, RetryConfig, RetryKind, SearchConfig};
use dossier_core::executor::traits::{PromptProcessorPlugin, RetryStrategyPlugin, RunObserverPlugin};
use dossier_core::executor::{ExecutionEngine, ExecutionOpts};
use dossier_core::gateway::{GenerationGateway, GenerationService, SearchGateway, SearchService};

use crate::backend::{OpenAiGenerationService, SerperSearchService};
use crate::executor::{
    ExponentialBackoffPlugin, JsonlObserverPlugin, LinearRetryPlugin, PromptEnhancerPlugin,
    ResearchProcessorPlugin, TextObserverPlugin,
};

pub fn build_generation_service(cfg: &AppConfig) -> Result<Arc<dyn GenerationService>> {
    Ok(Arc::new(OpenAiGenerationService::new(&cfg.generation)?))
}

pub fn build_retry(cfg: &RetryConfig) -> Option<Arc<dyn RetryStrategyPlugin>> {
    match cfg.strategy {
        RetryKind::None => None,
        RetryKind::ExponentialBackoff => Some(Arc::new(ExponentialBackoffPlugin::new(cfg.clone()))),
        RetryKind::Linear => Some(Arc::new(LinearRetryPlugin::new(cfg.clone()))),
    }
}

pub fn build_generation_gateway(
    cfg: &AppConfig,
    service: Arc<dyn GenerationService>,
) -> GenerationGateway {
    let gateway = GenerationGateway::new(service, Duration::from_millis(cfg.generation.timeout_ms))
        .with_budget(cfg.generation.max_calls);
    match build_retry(&cfg.retry) {
        Some(strategy) => gateway.with_retry(strategy),
        None => gateway,
    }
}

pub fn build_search_gateway(
    cfg: &SearchConfig,
    service: Arc<dyn SearchService>,
) -> SearchGateway {
    SearchGateway::new(service, Duration::from_millis(cfg.timeout_ms))
        .with_budget(cfg.max_calls)
        .with_min_interval(Duration::from_millis(cfg.min_interval_ms))
        .with_results_per_query(cfg.results_per_query)
}

pub fn build_observer(stream_format: &str) -> Option<Arc<dyn RunObserverPlugin>> {
    match stream_format {
        "jsonl" => Some(Arc::new(JsonlObserverPlugin::new(false))),
        "text" => Some(Arc::new(TextObserverPlugin::new(false))),
        // "none": events only go to tracing.
        _ => None,
    }
}

pub fn build_processors(
    cfg: &AppConfig,
    search: Option<Arc<SearchGateway>>,
) -> Vec<Arc<dyn PromptProcessorPlugin>> {
    let mut processors: Vec<Arc<dyn PromptProcessorPlugin>> =
        vec![Arc::new(PromptEnhancerPlugin::for_language(&cfg.report.language))];
    if let Some(search) = search {
        processors.push(Arc::new(ResearchProcessorPlugin::new(search, &cfg.search)));
    }
    processors
}

/// Engine wired to the configured HTTP backends.
///
/// `with_research` adds the search backend for pipelines whose agents may search.
pub fn build_engine(
    cfg: &AppConfig,
    stream_format: &str,
    with_research: bool,
) -> Result<ExecutionEngine> {
    let generation = build_generation_service(cfg)?;
    let search = if with_research {
        let service: Arc<dyn SearchService> = Arc::new(SerperSearchService::new(&cfg.search)?);
        Some(Arc::new(build_search_gateway(&cfg.search, service)))
    } else {
        None
    };
    Ok(assemble_engine(cfg, stream_format, generation, search))
}

/// Engine around caller-supplied services.
pub fn assemble_engine(
    cfg: &AppConfig,
    stream_format: &str,
    generation: Arc<dyn GenerationService>,
    search: Option<Arc<SearchGateway>>,
) -> ExecutionEngine {
    let gateway = Arc::new(build_generation_gateway(cfg, generation));
    let mut opts = ExecutionOpts::from(&cfg.executor);
    if stream_format == "jsonl" {
        opts.progress_bar = false;
    }

    let mut builder = ExecutionEngine::builder(gateway)
        .processors(build_processors(cfg, search))
        .opts(opts);
    if let Some(observer) = build_observer(stream_format) {
        builder = builder.observer(observer);
    }
    builder.build()
}
