//! CLI application layer: applies overrides, assembles the report job and runs one command.
use std::path::Path;

use dossier_core::api as core_api;
use dossier_core::error::CliError;
use dossier_core::input::SourceDocument;
use dossier_plugins::factory;
use dossier_plugins::presets::Preset;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::commands::cli::{Args, Commands, ContractArgs, MarketArgs, PlanArgs, RenderArgs};

pub async fn run(args: Args, mut cfg: core_api::AppConfig) -> Result<i32, CliError> {
    if let Some(format) = args.stream_format {
        cfg.executor.stream_format = format.as_str().to_string();
    }
    if let Some(dir) = &args.output_dir {
        cfg.output.directory = dir.to_string_lossy().to_string();
    }

    match args.command {
        Commands::Market(market) => run_market(market, &cfg).await,
        Commands::Contract(contract) => run_contract(contract, &cfg).await,
        Commands::Render(render) => run_render(render, &cfg),
        Commands::Plan(plan) => run_plan(plan, &cfg),
    }
}

async fn run_market(args: MarketArgs, cfg: &core_api::AppConfig) -> Result<i32, CliError> {
    let mut vars = core_api::Variables::parse_pairs(&args.vars).map_err(CliError::Command)?;
    vars.insert("sector", args.sector);
    vars.insert("region", args.region);
    vars.insert("company", args.company);

    let ctx = core_api::ExecutionContext::new(vars);
    run_preset(Preset::Market, ctx, None, cfg).await
}

async fn run_contract(args: ContractArgs, cfg: &core_api::AppConfig) -> Result<i32, CliError> {
    let name = args.name.clone().or_else(|| file_name(&args.text));
    let document = SourceDocument::from_file(&args.text)?.with_name(name.clone());
    if document.is_empty() {
        return Err(CliError::Command(format!(
            "no text found in {}",
            args.text.display()
        )));
    }
    tracing::info!(
        target: "dossier.cli",
        path = %args.text.display(),
        pages = document.page_count(),
        "contract text loaded"
    );

    let ctx = core_api::ExecutionContext::new(core_api::Variables::new())
        .with_source_document(document);
    run_preset(Preset::Contract, ctx, name.as_deref(), cfg).await
}

#[tracing::instrument(name = "cli.run_preset", skip(ctx, document_name, cfg), fields(run_id = %ctx.run_id()))]
async fn run_preset(
    preset: Preset,
    ctx: core_api::ExecutionContext,
    document_name: Option<&str>,
    cfg: &core_api::AppConfig,
) -> Result<i32, CliError> {
    let stream_format = cfg.executor.stream_format.as_str();
    let engine = factory::build_engine(cfg, stream_format, preset == Preset::Market)?;
    let job = core_api::ReportJob::new(engine, core_api::RenderSettings::from(&cfg.output));

    let title = preset.title(ctx.variables(), document_name);
    let request = core_api::ReportRequest {
        pipeline: preset.pipeline(&cfg.report).map_err(core_api::ReportError::from)?,
        file_stem: core_api::file_stem(&title),
        title,
        subtitle: cfg.report.prepared_by.clone(),
        charts: preset.charts(&cfg.report),
        context: ctx,
    };

    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(target: "dossier.cli", "interrupt received, cancelling run");
            guard.cancel();
        }
    });

    let outcome = job.run(request, &cancel).await?;
    print_rendered(&outcome.rendered, Some(&outcome.run_id), stream_format);
    Ok(0)
}

fn run_render(args: RenderArgs, cfg: &core_api::AppConfig) -> Result<i32, CliError> {
    let markdown = std::fs::read_to_string(&args.input)?;
    let stem = args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    let title = args.title.clone().unwrap_or_else(|| stem.clone());

    let mut settings = core_api::RenderSettings::from(&cfg.output);
    // The input already is the Markdown.
    settings.markdown_mirror = false;

    let run_id = uuid::Uuid::new_v4().to_string();
    let metadata = core_api::DocumentMetadata::new(title, &run_id)
        .with_subtitle(cfg.report.prepared_by.clone());
    let charts: Vec<core_api::SpiderChart> = if args.charts {
        cfg.report.charts.iter().map(core_api::SpiderChart::from).collect()
    } else {
        Vec::new()
    };

    let rendered = core_api::render_markdown_report(
        &markdown,
        metadata,
        &charts,
        &settings,
        &core_api::file_stem(&stem),
    )
    .map_err(core_api::ReportError::from)?;
    print_rendered(&rendered, None, cfg.executor.stream_format.as_str());
    Ok(0)
}

fn run_plan(args: PlanArgs, cfg: &core_api::AppConfig) -> Result<i32, CliError> {
    let preset: Preset = args.preset.parse().map_err(CliError::Command)?;
    let pipeline = preset.pipeline(&cfg.report).map_err(core_api::ReportError::from)?;

    println!("Pipeline '{}' ({} tasks)", pipeline.name(), pipeline.tasks().len());
    for (idx, task) in pipeline.ordered_tasks().enumerate() {
        let deps = task.dependencies();
        if deps.is_empty() {
            println!("  {}. {} [{}]", idx + 1, task.id(), task.agent().role());
        } else {
            println!(
                "  {}. {} [{}] after {}",
                idx + 1,
                task.id(),
                task.agent().role(),
                deps.join(", ")
            );
        }
    }
    let required = preset.required_variables();
    if !required.is_empty() {
        println!("Variables: {}", required.join(", "));
    }
    Ok(0)
}

fn print_rendered(rendered: &core_api::RenderedReport, run_id: Option<&str>, stream_format: &str) {
    let summary = core_api::DiagnosticSummary::from_diagnostics(&rendered.diagnostics);
    for d in &rendered.diagnostics {
        tracing::info!(target: "dossier.cli", kind = ?d.kind, "{d}");
    }

    if stream_format == "jsonl" {
        let value = json!({
            "v": 1,
            "event_type": "report.written",
            "run_id": run_id,
            "document": rendered.document_path,
            "markdown": rendered.markdown_path,
            "diagnostics": rendered.diagnostics,
            "summary": summary.to_string(),
        });
        println!("{value}");
        return;
    }

    println!("Document: {}", rendered.document_path.display());
    if let Some(path) = &rendered.markdown_path {
        println!("Markdown: {}", path.display());
    }
    println!("Diagnostics: {summary}");
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}
