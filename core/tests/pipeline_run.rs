mod common;

use std::sync::Arc;

use dossier_core::error::{ExecutorError, GatewayError, TaskError, TemplateError};
use dossier_core::pipeline::{ExecutionContext, Pipeline, TaskDescriptor, Variables};
use dossier_core::testing::ScriptedGenerationService;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use common::{analyst, engine_with, three_step_pipeline};

fn sector_vars() -> Variables {
    Variables::new().with("sector", "cloud storage")
}

#[tokio::test]
async fn second_task_failure_aborts_the_run() {
    let service = Arc::new(
        ScriptedGenerationService::new()
            .fail("two", GatewayError::ServiceUnavailable("503".into())),
    );
    let engine = engine_with(service.clone());

    let result = engine
        .run(
            &three_step_pipeline(),
            ExecutionContext::new(sector_vars()),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.final_output, None);
    assert_eq!(result.task_results.len(), 1);
    assert_eq!(result.task_results[0].task_id, "one");
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].task_id, "two");
    assert_eq!(
        result.failures[0].error,
        TaskError::Gateway(GatewayError::ServiceUnavailable("503".into()))
    );
    assert_eq!(service.called_task_ids(), vec!["one", "two"]);
}

#[tokio::test]
async fn unbound_placeholder_makes_no_calls() {
    let service = Arc::new(ScriptedGenerationService::new());
    let engine = engine_with(service.clone());

    let err = engine
        .run(
            &three_step_pipeline(),
            ExecutionContext::new(Variables::new().with("region", "EU")),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        ExecutorError::Template(TemplateError::UnboundPlaceholder { name, .. }) => {
            assert_eq!(name, "sector")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn every_prompt_sees_all_prior_outputs() {
    let agent = analyst();
    let pipeline = Pipeline::builder("diamond")
        .task(TaskDescriptor::new("report", "Write", "Report", agent.clone()).depends_on("trends"))
        .task(TaskDescriptor::new("trends", "Trends", "Trends", agent.clone()).depends_on("facts"))
        .task(TaskDescriptor::new("facts", "Facts on {sector}", "Facts", agent.clone()))
        .task(TaskDescriptor::new("risks", "Risks", "Risks", agent).depends_on("facts"))
        .final_task("report")
        .build()
        .unwrap();

    let service = Arc::new(ScriptedGenerationService::new());
    let engine = engine_with(service.clone());
    let result = engine
        .run(
            &pipeline,
            ExecutionContext::new(sector_vars()),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let order = service.called_task_ids();
    assert_eq!(order, result.order);
    assert_eq!(order, vec!["facts", "trends", "report", "risks"]);
    for task in pipeline.tasks() {
        let pos = |id: &str| order.iter().position(|o| o == id).unwrap();
        for dep in task.dependencies() {
            assert!(pos(dep) < pos(task.id()), "{dep} must run before {}", task.id());
        }
    }

    for (i, id) in order.iter().enumerate() {
        let prompt = service.prompt_for(id).unwrap();
        for prior in &order[..i] {
            assert!(
                prompt.transcript.contains(&format!("output of {prior}")),
                "prompt of {id} is missing output of {prior}"
            );
        }
    }
    assert_eq!(result.final_output.as_deref(), Some("output of report"));
}

#[tokio::test]
async fn variables_reach_the_prompt() {
    let service = Arc::new(ScriptedGenerationService::new());
    let engine = engine_with(service.clone());
    engine
        .run(
            &three_step_pipeline(),
            ExecutionContext::new(sector_vars()),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let prompt = service.prompt_for("one").unwrap();
    assert_eq!(prompt.description, "Collect facts on cloud storage");
    assert_eq!(prompt.goal, "Analyse the cloud storage market");
    assert!(!prompt.user_prompt().contains("{sector}"));
}
