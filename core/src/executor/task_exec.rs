use std::sync::Arc;
use std::time::Instant;

use crate::error::{TaskError, TemplateError};
use crate::gateway::{GenerationGateway, Invocation, PromptContext};
use crate::pipeline::{ExecutionContext, TaskDescriptor};

use super::traits::{ProcessContext, PromptProcessorPlugin};
use super::types::{TaskFailure, TaskResult};

/// Runs a single task: prompt assembly, processors, one gateway invocation.
pub struct TaskExecutor<'a> {
    gateway: &'a GenerationGateway,
    processors: &'a [Arc<dyn PromptProcessorPlugin>],
}

impl<'a> TaskExecutor<'a> {
    pub fn new(
        gateway: &'a GenerationGateway,
        processors: &'a [Arc<dyn PromptProcessorPlugin>],
    ) -> Self {
        Self {
            gateway,
            processors,
        }
    }

    /// Prompt for `task` given everything accumulated in `ctx` so far.
    pub fn build_prompt(
        task: &TaskDescriptor,
        ctx: &ExecutionContext,
    ) -> Result<PromptContext, TemplateError> {
        let rendered = task.render(ctx.variables())?;
        Ok(PromptContext {
            task_id: task.id().to_string(),
            role: task.agent().role().to_string(),
            goal: rendered.goal,
            backstory: rendered.backstory,
            description: rendered.description,
            expected_output: task.expected_output().to_string(),
            transcript: ctx.transcript().render(),
            source_document: ctx.source_document().map(|doc| doc.render()),
            research_notes: Vec::new(),
        })
    }

    pub async fn execute(
        &self,
        task: &TaskDescriptor,
        ctx: &ExecutionContext,
        index: usize,
    ) -> Result<TaskResult, TaskFailure> {
        let start = Instant::now();

        match self.run(task, ctx, index).await {
            Ok(invocation) => Ok(TaskResult {
                task_id: task.id().to_string(),
                output: invocation.text,
                duration_ms: start.elapsed().as_millis() as u64,
                attempts: invocation.attempts,
            }),
            Err(error) => Err(TaskFailure {
                task_id: task.id().to_string(),
                error,
                duration_ms: start.elapsed().as_millis() as u64,
            }),
        }
    }

    async fn run(
        &self,
        task: &TaskDescriptor,
        ctx: &ExecutionContext,
        index: usize,
    ) -> Result<Invocation, TaskError> {
        let mut prompt = Self::build_prompt(task, ctx)?;

        let process_ctx = ProcessContext {
            run_id: ctx.run_id(),
            task_index: index,
            variables: ctx.variables(),
        };
        for processor in self.processors {
            prompt = processor
                .process(task, prompt, &process_ctx)
                .await
                .map_err(|e| TaskError::from_processor(processor.name(), e))?;
        }

        Ok(self.gateway.invoke(&prompt).await?)
    }
}
