//! Report job: pipeline run → Markdown → document artifact.
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::artifacts::{SpiderChart, TempArtifacts};
use crate::config::OutputConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::document::{
    persist_document, write_atomic, DocumentMetadata, DocumentRenderer, HtmlWriter, RenderOptions,
};
use crate::error::{ExecutorError, RenderError, ReportError};
use crate::executor::{ExecutionEngine, PipelineResult};
use crate::markdown::{MarkdownParser, ParseOptions, StructuralBlock};
use crate::pipeline::{ExecutionContext, Pipeline};

/// Where and how a report is written.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub output_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub markdown_mirror: bool,
    pub image_width_px: u32,
    pub keep_separators: bool,
}

impl From<&OutputConfig> for RenderSettings {
    fn from(cfg: &OutputConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&cfg.directory),
            artifacts_dir: cfg
                .artifacts_dir
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            markdown_mirror: cfg.markdown_mirror,
            image_width_px: cfg.image_width_px,
            keep_separators: cfg.keep_separators,
        }
    }
}

pub struct ReportRequest {
    pub pipeline: Pipeline,
    pub context: ExecutionContext,
    pub title: String,
    pub subtitle: Option<String>,
    pub charts: Vec<SpiderChart>,

    /// File name of the artifacts without extension.
    pub file_stem: String,
}

/// Paths written by a successful render.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub document_path: PathBuf,
    pub markdown_path: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub run_id: String,
    pub rendered: RenderedReport,
    pub pipeline: PipelineResult,
}

pub struct ReportJob {
    engine: ExecutionEngine,
    settings: RenderSettings,
}

impl ReportJob {
    pub fn new(engine: ExecutionEngine, settings: RenderSettings) -> Self {
        Self { engine, settings }
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Run the pipeline and render the final task's output.
    ///
    /// Chart files live for the duration of this call only, whatever the
    /// outcome.
    pub async fn run(
        &self,
        request: ReportRequest,
        cancel: &CancellationToken,
    ) -> Result<ReportOutcome, ReportError> {
        let ReportRequest {
            pipeline,
            context,
            title,
            subtitle,
            charts,
            file_stem,
        } = request;

        let run_id = context.run_id().to_string();
        tracing::info!(
            target: "dossier.report",
            %run_id,
            pipeline = %pipeline.name(),
            charts = charts.len(),
            "report job started"
        );

        let mut artifacts = TempArtifacts::new(&self.settings.artifacts_dir, &run_id);
        let mut diagnostics = Vec::new();
        let chart_paths = stage_charts(&charts, &mut artifacts, &mut diagnostics);

        let result = self.engine.run(&pipeline, context, cancel).await?;
        let Some(markdown) = result.final_output.clone() else {
            return Err(match result.first_failure() {
                Some(failure) => ReportError::TaskFailed {
                    task_id: failure.task_id.clone(),
                    error: failure.error.clone(),
                    partial: Box::new(result),
                },
                None => ExecutorError::UnknownFinalTask(result.final_task_id.clone()).into(),
            });
        };

        let metadata = DocumentMetadata::new(title, &run_id).with_subtitle(subtitle);
        let rendered = render_document(
            &markdown,
            metadata,
            &chart_paths,
            &self.settings,
            &file_stem,
            diagnostics,
        )?;
        artifacts.release();

        Ok(ReportOutcome {
            run_id,
            rendered,
            pipeline: result,
        })
    }
}

/// Render existing Markdown without running a pipeline.
pub fn render_markdown_report(
    markdown: &str,
    metadata: DocumentMetadata,
    charts: &[SpiderChart],
    settings: &RenderSettings,
    file_stem: &str,
) -> Result<RenderedReport, RenderError> {
    let mut artifacts = TempArtifacts::new(&settings.artifacts_dir, &metadata.run_id);
    let mut diagnostics = Vec::new();
    let chart_paths = stage_charts(charts, &mut artifacts, &mut diagnostics);
    let rendered = render_document(
        markdown,
        metadata,
        &chart_paths,
        settings,
        file_stem,
        diagnostics,
    );
    artifacts.release();
    rendered
}

/// `"Market analysis report: Cloud / EU"` → `"market_analysis_report_cloud_eu"`.
pub fn file_stem(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            stem.extend(c.to_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem: String = stem.trim_end_matches('_').chars().take(80).collect();
    if stem.is_empty() {
        "report".to_string()
    } else {
        stem
    }
}

fn stage_charts(
    charts: &[SpiderChart],
    artifacts: &mut TempArtifacts,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(charts.len());
    for chart in charts {
        let written = chart
            .to_svg()
            .and_then(|svg| {
                artifacts
                    .write(&chart.name, "svg", svg.as_bytes())
                    .map_err(|e| e.to_string())
            });
        match written {
            Ok(path) => paths.push(path),
            Err(reason) => {
                tracing::warn!(target: "dossier.report", chart = %chart.name, %reason, "chart skipped");
                diagnostics.push(Diagnostic::new(DiagnosticKind::ChartSkipped, reason));
            }
        }
    }
    paths
}

fn render_document(
    markdown: &str,
    metadata: DocumentMetadata,
    chart_paths: &[PathBuf],
    settings: &RenderSettings,
    file_stem: &str,
    mut diagnostics: Vec<Diagnostic>,
) -> Result<RenderedReport, RenderError> {
    let parsed = MarkdownParser::new(markdown)
        .with_options(ParseOptions {
            keep_separators: settings.keep_separators,
        })
        .parse();
    diagnostics.extend(parsed.diagnostics);

    let blocks = parsed.blocks.into_iter().chain(
        chart_paths
            .iter()
            .map(|path| StructuralBlock::ImageRef { path: path.clone() }),
    );
    let renderer = DocumentRenderer::new(RenderOptions {
        image_width_px: settings.image_width_px,
    });
    let output = renderer.render(blocks, metadata);
    diagnostics.extend(output.diagnostics);

    let document_path = persist_document(
        &output.document,
        &HtmlWriter,
        &settings.output_dir,
        file_stem,
    )?;
    let markdown_path = if settings.markdown_mirror {
        let path = mirror_path(&settings.output_dir, file_stem);
        if let Err(err) = write_atomic(&path, markdown.as_bytes()) {
            // Both artifacts or neither.
            if let Err(e) = std::fs::remove_file(&document_path) {
                tracing::warn!(
                    target: "dossier.report",
                    document = %document_path.display(),
                    error = %e,
                    "failed to remove document after mirror write failure"
                );
            }
            return Err(err);
        }
        Some(path)
    } else {
        None
    };

    tracing::info!(
        target: "dossier.report",
        document = %document_path.display(),
        diagnostics = diagnostics.len(),
        "report written"
    );
    Ok(RenderedReport {
        document_path,
        markdown_path,
        diagnostics,
    })
}

fn mirror_path(dir: &Path, file_stem: &str) -> PathBuf {
    dir.join(format!("{file_stem}.md"))
}
