use crate::error::TaskError;
use crate::executor::types::{RunSummary, TaskResult};

/// Run observer plugin (controls how run progress is reported)
pub trait RunObserverPlugin: Send + Sync {
    fn name(&self) -> &str;
    fn format(&self) -> &str;
    fn observe(&self, event: &RunEvent);
}

#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStart {
        run_id: String,
        pipeline: String,
        total_tasks: usize,
    },
    Plan {
        run_id: String,
        order: Vec<String>,
    },
    TaskStart {
        run_id: String,
        task_id: String,
        role: String,
        index: usize,
    },
    TaskComplete {
        run_id: String,
        result: TaskResult,
    },
    TaskFailed {
        run_id: String,
        task_id: String,
        error: TaskError,
    },
    RunEnd {
        run_id: String,
        summary: RunSummary,
        success: bool,
    },
}

impl RunEvent {
    pub fn run_id(&self) -> &str {
        match self {
            Self::RunStart { run_id, .. }
            | Self::Plan { run_id, .. }
            | Self::TaskStart { run_id, .. }
            | Self::TaskComplete { run_id, .. }
            | Self::TaskFailed { run_id, .. }
            | Self::RunEnd { run_id, .. } => run_id,
        }
    }

    /// Dotted event name used by structured observers.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStart { .. } => "run.start",
            Self::Plan { .. } => "executor.plan",
            Self::TaskStart { .. } => "task.start",
            Self::TaskComplete { .. } => "task.end",
            Self::TaskFailed { .. } => "task.failed",
            Self::RunEnd { .. } => "run.end",
        }
    }
}
