use serde::Serialize;

use crate::error::TaskError;

/// Output of a task that completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResult {
    pub task_id: String,

    /// Raw generated text.
    pub output: String,

    /// Wall time including processors and retries.
    pub duration_ms: u64,

    /// Generation attempts used (1 = no retry).
    pub attempts: u32,
}

/// A task that did not produce output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task_id: String,
    pub error: TaskError,
    pub duration_ms: u64,
}

/// Result of one pipeline run.
///
/// On success `final_output` is set and `failures` is empty. On abort
/// `final_output` is `None`, `failures` names the failing task and
/// `task_results` holds only the tasks that completed before it.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub run_id: String,
    pub final_task_id: String,
    pub final_output: Option<String>,
    pub task_results: Vec<TaskResult>,
    pub failures: Vec<TaskFailure>,

    /// Planned execution order.
    pub order: Vec<String>,
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.final_output.is_some()
    }

    pub fn first_failure(&self) -> Option<&TaskFailure> {
        self.failures.first()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_tasks: self.order.len(),
            completed: self.task_results.len(),
            failed: self.failures.len(),
            duration_ms: self.duration_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_tasks: usize,
    pub completed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}
