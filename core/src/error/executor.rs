use thiserror::Error;

use super::code::ErrorCode;
use super::gateway::{GatewayError, TemplateError};

/// Configuration errors detected before any task runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Pipeline has no tasks")]
    EmptyPipeline,

    #[error("Duplicate task ID: {0}")]
    DuplicateTaskId(String),

    #[error("Dependency not found: task '{task_id}' depends on '{missing_dep}'")]
    DependencyNotFound {
        task_id: String,
        missing_dep: String,
    },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Final task '{0}' is not part of the pipeline")]
    UnknownFinalTask(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl ExecutorError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyPipeline => ErrorCode::ValidationError,
            Self::DuplicateTaskId(_) => ErrorCode::ValidationError,
            Self::DependencyNotFound { .. } => ErrorCode::DependencyError,
            Self::CircularDependency(_) => ErrorCode::CircularDependency,
            Self::UnknownFinalTask(_) => ErrorCode::TaskNotFound,
            Self::Template(e) => e.error_code(),
        }
    }
}

/// Failure reported by a prompt processor plugin.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Why a single task did not produce output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("processor '{processor}' failed: {message}")]
    Processor { processor: String, message: String },

    #[error("run cancelled")]
    Cancelled,
}

impl TaskError {
    /// Short tag printed next to the failing task id.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Template(_) => "UnboundPlaceholder",
            Self::Gateway(e) => e.kind(),
            Self::Processor { .. } => "ProcessorError",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Template(e) => e.error_code(),
            Self::Gateway(e) => e.error_code(),
            Self::Processor { .. } => ErrorCode::ProcessorError,
            Self::Cancelled => ErrorCode::Cancelled,
        }
    }

    /// Gateway failures raised inside a processor keep their gateway kind.
    pub fn from_processor(processor: &str, err: ProcessorError) -> Self {
        match err {
            ProcessorError::Gateway(e) => Self::Gateway(e),
            other => Self::Processor {
                processor: processor.to_string(),
                message: other.to_string(),
            },
        }
    }
}
