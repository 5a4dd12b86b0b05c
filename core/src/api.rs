//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `dossier_core::api` instead of reaching into internal modules.

pub use crate::artifacts::{SpiderChart, TempArtifacts};
pub use crate::config::{
    load_default, load_env_files, load_from_path, AppConfig, ChartConfig, ExecutorConfig,
    GenerationConfig, LoggingConfig, OutputConfig, ReportConfig, RetryConfig, RetryKind,
    SearchConfig, SearchFailureMode,
};
pub use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSummary};
pub use crate::document::{DocumentMetadata, DocumentRenderer, HtmlWriter, OutputDocument};
pub use crate::error::{
    CliError, ErrorCode, ExecutorError, GatewayError, ProcessorError, RenderError, ReportError,
    TaskError, TemplateError,
};
pub use crate::executor::traits::{
    ProcessContext, PromptProcessorPlugin, RetryStrategyPlugin, RunEvent, RunObserverPlugin,
};
pub use crate::executor::{ExecutionEngine, ExecutionOpts, PipelineResult, RunSummary, TaskResult};
pub use crate::gateway::{
    GenerationGateway, GenerationService, PromptContext, SearchGateway, SearchHit, SearchService,
};
pub use crate::input::SourceDocument;
pub use crate::markdown::{parse, StructuralBlock, TextRun};
pub use crate::pipeline::{
    AgentDescriptor, Capability, ExecutionContext, Pipeline, TaskDescriptor, Variables,
};
pub use crate::report::{
    file_stem, render_markdown_report, RenderSettings, RenderedReport, ReportJob, ReportOutcome,
    ReportRequest,
};
