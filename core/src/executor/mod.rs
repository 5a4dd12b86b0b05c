//! Pipeline execution engine
//!
//! ```text
//! Pipeline (validated TaskGraph order)
//!   ↓
//! ExecutionEngine::run() → check every template binding
//!   ↓  for each task, in order
//! TaskExecutor::execute() → prompt + processors → GenerationGateway
//!   ↓
//! TranscriptLog::append() / fail-fast on the first TaskFailure
//!   ↓
//! PipelineResult
//! ```

mod engine;
mod graph;
mod output;
mod progress;
mod task_exec;
pub mod traits;
pub mod types;

pub use engine::{ExecutionEngine, ExecutionEngineBuilder};
pub use graph::TaskGraph;
pub use output::emit_event;
pub use progress::ProgressMonitor;
pub use task_exec::TaskExecutor;
pub use types::{ExecutionOpts, PipelineResult, RunSummary, TaskFailure, TaskResult};
