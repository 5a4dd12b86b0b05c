use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::error::{ExecutorError, TaskError};
use crate::gateway::GenerationGateway;
use crate::pipeline::{ExecutionContext, Pipeline};

use super::output::emit_event;
use super::progress::ProgressMonitor;
use super::task_exec::TaskExecutor;
use super::traits::{PromptProcessorPlugin, RunEvent, RunObserverPlugin};
use super::types::{ExecutionOpts, PipelineResult, TaskFailure};

/// Drives a [`Pipeline`] task by task, fail-fast.
pub struct ExecutionEngine {
    gateway: Arc<GenerationGateway>,
    processors: Vec<Arc<dyn PromptProcessorPlugin>>,
    observer: Option<Arc<dyn RunObserverPlugin>>,
    opts: ExecutionOpts,
}

pub struct ExecutionEngineBuilder {
    gateway: Arc<GenerationGateway>,
    processors: Vec<Arc<dyn PromptProcessorPlugin>>,
    observer: Option<Arc<dyn RunObserverPlugin>>,
    opts: ExecutionOpts,
}

impl ExecutionEngine {
    pub fn new(gateway: Arc<GenerationGateway>) -> Self {
        Self::builder(gateway).build()
    }

    pub fn builder(gateway: Arc<GenerationGateway>) -> ExecutionEngineBuilder {
        ExecutionEngineBuilder::new(gateway)
    }

    pub fn gateway(&self) -> &GenerationGateway {
        &self.gateway
    }

    /// Run every task of `pipeline` in order.
    ///
    /// Configuration problems (unbound placeholders) are returned as `Err`
    /// before any external call. Task failures end the run and are reported
    /// inside the returned [`PipelineResult`].
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        mut ctx: ExecutionContext,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, ExecutorError> {
        pipeline.check_bindings(ctx.variables())?;

        let start = Instant::now();
        let run_id = ctx.run_id().to_string();
        let order = pipeline.execution_order();

        self.emit(RunEvent::RunStart {
            run_id: run_id.clone(),
            pipeline: pipeline.name().to_string(),
            total_tasks: order.len(),
        });
        self.emit(RunEvent::Plan {
            run_id: run_id.clone(),
            order: order.clone(),
        });

        let mut progress = ProgressMonitor::new(order.len(), self.opts.progress_bar);
        let executor = TaskExecutor::new(&self.gateway, &self.processors);
        let mut task_results = Vec::with_capacity(order.len());
        let mut failures = Vec::new();

        for (index, task) in pipeline.ordered_tasks().enumerate() {
            let task_start = Instant::now();
            let cancelled = || TaskFailure {
                task_id: task.id().to_string(),
                error: TaskError::Cancelled,
                duration_ms: task_start.elapsed().as_millis() as u64,
            };

            let outcome = if cancel.is_cancelled() {
                Err(cancelled())
            } else {
                self.emit(RunEvent::TaskStart {
                    run_id: run_id.clone(),
                    task_id: task.id().to_string(),
                    role: task.agent().role().to_string(),
                    index,
                });
                progress.start_task(task.id(), task.agent().role());

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(cancelled()),
                    result = executor.execute(task, &ctx, index) => result,
                }
            };

            match outcome {
                Ok(result) => {
                    progress.complete_task(&result.task_id, true, result.duration_ms);
                    ctx.record(&result.task_id, &result.output);
                    self.emit(RunEvent::TaskComplete {
                        run_id: run_id.clone(),
                        result: result.clone(),
                    });
                    task_results.push(result);
                }
                Err(failure) => {
                    progress.complete_task(&failure.task_id, false, failure.duration_ms);
                    self.emit(RunEvent::TaskFailed {
                        run_id: run_id.clone(),
                        task_id: failure.task_id.clone(),
                        error: failure.error.clone(),
                    });
                    failures.push(failure);
                    break;
                }
            }
        }

        let final_task_id = pipeline.final_task_id().to_string();
        let final_output = if failures.is_empty() {
            task_results
                .iter()
                .find(|r| r.task_id == final_task_id)
                .map(|r| r.output.clone())
        } else {
            None
        };

        let result = PipelineResult {
            run_id: run_id.clone(),
            final_task_id,
            final_output,
            task_results,
            failures,
            order,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        progress.finish(result.is_success());
        self.emit(RunEvent::RunEnd {
            run_id,
            summary: result.summary(),
            success: result.is_success(),
        });

        Ok(result)
    }

    fn emit(&self, event: RunEvent) {
        match &self.observer {
            Some(observer) => observer.observe(&event),
            None => emit_event(&event),
        }
    }
}

impl ExecutionEngineBuilder {
    pub fn new(gateway: Arc<GenerationGateway>) -> Self {
        Self {
            gateway,
            processors: Vec::new(),
            observer: None,
            opts: ExecutionOpts::default(),
        }
    }

    /// Processors run in descending priority order.
    pub fn processors(mut self, mut processors: Vec<Arc<dyn PromptProcessorPlugin>>) -> Self {
        processors.sort_by_key(|p| std::cmp::Reverse(p.priority()));
        self.processors = processors;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn RunObserverPlugin>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn opts(mut self, opts: ExecutionOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn build(self) -> ExecutionEngine {
        ExecutionEngine {
            gateway: self.gateway,
            processors: self.processors,
            observer: self.observer,
            opts: self.opts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GatewayError, ProcessorError};
    use crate::gateway::PromptContext;
    use crate::pipeline::{AgentDescriptor, TaskDescriptor, Variables};
    use crate::testing::ScriptedGenerationService;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl RunObserverPlugin for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn format(&self) -> &str {
            "test"
        }

        fn observe(&self, event: &RunEvent) {
            self.events.lock().unwrap().push(event.event_type().to_string());
        }
    }

    struct Tag(&'static str, i32);

    #[async_trait]
    impl PromptProcessorPlugin for Tag {
        fn name(&self) -> &str {
            self.0
        }

        fn priority(&self) -> i32 {
            self.1
        }

        async fn process(
            &self,
            _task: &TaskDescriptor,
            mut prompt: PromptContext,
            _context: &crate::executor::traits::ProcessContext<'_>,
        ) -> Result<PromptContext, ProcessorError> {
            prompt.research_notes.push(self.0.to_string());
            Ok(prompt)
        }
    }

    fn pipeline() -> Pipeline {
        let agent = Arc::new(AgentDescriptor::new("Analyst", "Study {sector}", "Analyst"));
        Pipeline::builder("three")
            .task(TaskDescriptor::new("one", "First {sector}", "", agent.clone()))
            .task(TaskDescriptor::new("two", "Second", "", agent.clone()))
            .task(TaskDescriptor::new("three", "Third", "", agent))
            .build()
            .unwrap()
    }

    fn engine(service: Arc<ScriptedGenerationService>) -> ExecutionEngineBuilder {
        let gateway = GenerationGateway::new(service, Duration::from_secs(5));
        ExecutionEngine::builder(Arc::new(gateway))
    }

    #[tokio::test]
    async fn test_events_are_emitted_in_order() {
        let service = Arc::new(ScriptedGenerationService::new());
        let recorder = Arc::new(Recorder::default());
        let engine = engine(service).observer(recorder.clone()).build();

        let ctx = ExecutionContext::new(Variables::new().with("sector", "energy"));
        let result = engine
            .run(&pipeline(), ctx, &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.final_output.as_deref(), Some("output of three"));
        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(events.first().map(String::as_str), Some("run.start"));
        assert_eq!(events.last().map(String::as_str), Some("run.end"));
        assert_eq!(events.iter().filter(|e| *e == "task.end").count(), 3);
    }

    #[tokio::test]
    async fn test_processors_sorted_by_priority() {
        let service = Arc::new(ScriptedGenerationService::new());
        let engine = engine(service.clone())
            .processors(vec![Arc::new(Tag("low", 1)), Arc::new(Tag("high", 10))])
            .build();

        let ctx = ExecutionContext::new(Variables::new().with("sector", "energy"));
        engine
            .run(&pipeline(), ctx, &CancellationToken::new())
            .await
            .unwrap();

        let prompt = service.prompt_for("one").unwrap();
        assert_eq!(prompt.research_notes, vec!["high".to_string(), "low".to_string()]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let service = Arc::new(ScriptedGenerationService::new());
        let engine = engine(service.clone()).build();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let ctx = ExecutionContext::new(Variables::new().with("sector", "energy"));
        let result = engine.run(&pipeline(), ctx, &cancel).await.unwrap();

        assert_eq!(service.call_count(), 0);
        assert!(result.final_output.is_none());
        assert_eq!(result.failures[0].task_id, "one");
        assert_eq!(result.failures[0].error, TaskError::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_in_flight_call() {
        let service = Arc::new(
            ScriptedGenerationService::new().with_delay(Duration::from_secs(30)),
        );
        let gateway = GenerationGateway::new(service.clone(), Duration::from_secs(120));
        let engine = ExecutionEngine::new(Arc::new(gateway));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let ctx = ExecutionContext::new(Variables::new().with("sector", "energy"));
        let result = engine.run(&pipeline(), ctx, &cancel).await.unwrap();

        assert_eq!(service.call_count(), 1);
        assert!(result.task_results.is_empty());
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].error, TaskError::Cancelled);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_aborts_run() {
        let service = Arc::new(ScriptedGenerationService::new());
        let gateway =
            GenerationGateway::new(service.clone(), Duration::from_secs(5)).with_budget(2);
        let engine = ExecutionEngine::new(Arc::new(gateway));

        let ctx = ExecutionContext::new(Variables::new().with("sector", "energy"));
        let result = engine
            .run(&pipeline(), ctx, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.task_results.len(), 2);
        assert_eq!(
            result.failures[0].error,
            TaskError::Gateway(GatewayError::BudgetExhausted { limit: 2 })
        );
    }
}
