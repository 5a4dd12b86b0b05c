//! Pipeline definition: agents, tasks and the validated task order.
//!
//! A [`Pipeline`] is an explicit value assembled from injected agents and
//! tasks. Building it validates the dependency graph, so every `Pipeline`
//! that exists has a known, stable execution order.

mod agent;
mod context;
mod task;
mod template;

pub use agent::{AgentDescriptor, Capability};
pub use context::{ExecutionContext, TranscriptEntry, TranscriptLog, Variables};
pub use task::{RenderedTask, TaskDescriptor};
pub use template::PromptTemplate;

use crate::error::{ExecutorError, TemplateError};
use crate::executor::TaskGraph;

#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    tasks: Vec<TaskDescriptor>,
    order: Vec<usize>,
    final_task: usize,
}

impl Pipeline {
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder {
            name: name.into(),
            tasks: Vec::new(),
            final_task: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tasks in declaration order.
    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&TaskDescriptor> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Tasks in execution order.
    pub fn ordered_tasks(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.order.iter().map(|&i| &self.tasks[i])
    }

    pub fn execution_order(&self) -> Vec<String> {
        self.ordered_tasks().map(|t| t.id().to_string()).collect()
    }

    pub fn final_task_id(&self) -> &str {
        self.tasks[self.final_task].id()
    }

    /// Validate every template of every task against `vars`.
    pub fn check_bindings(&self, vars: &Variables) -> Result<(), TemplateError> {
        self.ordered_tasks()
            .try_for_each(|task| task.check_bindings(vars))
    }
}

pub struct PipelineBuilder {
    name: String,
    tasks: Vec<TaskDescriptor>,
    final_task: Option<String>,
}

impl PipelineBuilder {
    pub fn task(mut self, task: TaskDescriptor) -> Self {
        self.tasks.push(task);
        self
    }

    /// Task whose output becomes the run's final output. Defaults to the last task in order.
    pub fn final_task(mut self, task_id: impl Into<String>) -> Self {
        self.final_task = Some(task_id.into());
        self
    }

    pub fn build(self) -> Result<Pipeline, ExecutorError> {
        if self.tasks.is_empty() {
            return Err(ExecutorError::EmptyPipeline);
        }

        let graph = TaskGraph::from_tasks(&self.tasks)?;
        graph.validate()?;
        let order_ids = graph.execution_order()?;

        let index_of = |id: &str| self.tasks.iter().position(|t| t.id() == id);
        let order: Vec<usize> = order_ids.iter().filter_map(|id| index_of(id)).collect();

        let final_task = match &self.final_task {
            Some(id) => index_of(id).ok_or_else(|| ExecutorError::UnknownFinalTask(id.clone()))?,
            None => *order.last().ok_or(ExecutorError::EmptyPipeline)?,
        };

        Ok(Pipeline {
            name: self.name,
            tasks: self.tasks,
            order,
            final_task,
        })
    }
}
