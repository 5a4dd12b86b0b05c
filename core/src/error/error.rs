use thiserror::Error;

use super::code::ErrorCode;
use super::executor::{ExecutorError, TaskError};
use super::render::RenderError;
use crate::executor::PipelineResult;

/// Outcome of a failed report job.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("pipeline configuration error: {0}")]
    Executor(#[from] ExecutorError),

    /// A task failed; the partial result keeps every completed task's output.
    #[error("task '{task_id}' failed ({}): {error}", .error.kind())]
    TaskFailed {
        task_id: String,
        error: TaskError,
        partial: Box<PipelineResult>,
    },

    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

impl ReportError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Executor(e) => e.error_code(),
            Self::TaskFailed { error, .. } => error.error_code(),
            Self::Render(e) => e.error_code(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Report(#[from] ReportError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}
