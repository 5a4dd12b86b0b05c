use async_trait::async_trait;

use crate::error::ProcessorError;
use crate::gateway::PromptContext;
use crate::pipeline::{TaskDescriptor, Variables};

/// Prompt processor plugin (enriches a prompt before the generation call)
#[async_trait]
pub trait PromptProcessorPlugin: Send + Sync {
    /// Unique plugin name
    fn name(&self) -> &str;

    /// Higher priority runs first
    fn priority(&self) -> i32 {
        0
    }

    async fn process(
        &self,
        task: &TaskDescriptor,
        prompt: PromptContext,
        context: &ProcessContext<'_>,
    ) -> Result<PromptContext, ProcessorError>;
}

/// What a processor may read about the current run.
#[derive(Debug, Clone)]
pub struct ProcessContext<'a> {
    pub run_id: &'a str,
    /// Position of the task in the execution order.
    pub task_index: usize,
    pub variables: &'a Variables,
}
