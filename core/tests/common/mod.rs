use std::sync::Arc;
use std::time::Duration;

use dossier_core::executor::ExecutionEngine;
use dossier_core::gateway::GenerationGateway;
use dossier_core::pipeline::{AgentDescriptor, Pipeline, TaskDescriptor};
use dossier_core::testing::ScriptedGenerationService;

pub fn analyst() -> Arc<AgentDescriptor> {
    Arc::new(AgentDescriptor::new(
        "Analyst",
        "Analyse the {sector} market",
        "Ten years covering {sector}",
    ))
}

/// `one -> two -> three`, declared linearly.
pub fn three_step_pipeline() -> Pipeline {
    let agent = analyst();
    Pipeline::builder("three-step")
        .task(TaskDescriptor::new("one", "Collect facts on {sector}", "Facts", agent.clone()))
        .task(TaskDescriptor::new("two", "Find trends", "Trends", agent.clone()))
        .task(TaskDescriptor::new("three", "Write the report", "Report", agent))
        .build()
        .expect("valid pipeline")
}

pub fn engine_with(service: Arc<ScriptedGenerationService>) -> ExecutionEngine {
    let gateway = GenerationGateway::new(service, Duration::from_secs(5));
    ExecutionEngine::builder(Arc::new(gateway)).build()
}
