use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dossier_core::config::AppConfig;
use dossier_core::error::GatewayError;
use dossier_core::gateway::{SearchHit, SearchService};
use dossier_core::pipeline::{ExecutionContext, Variables};
use dossier_core::report::{file_stem, RenderSettings, ReportJob, ReportRequest};
use dossier_core::testing::ScriptedGenerationService;
use dossier_plugins::factory::{assemble_engine, build_search_gateway};
use dossier_plugins::presets::Preset;
use tokio_util::sync::CancellationToken;

struct StaticSearch;

#[async_trait]
impl SearchService for StaticSearch {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &str, _limit: usize) -> Result<Vec<SearchHit>, GatewayError> {
        Ok(vec![SearchHit {
            title: format!("Report on {query}"),
            link: "https://example.com/robotics".into(),
            snippet: "Robotics demand grew 14% in 2024".into(),
        }])
    }

    async fn scrape(&self, _url: &str) -> Result<String, GatewayError> {
        Ok("Vendor A holds 31% of the market".into())
    }
}

const REPORT: &str = "\
# Robotics in the EU

## Executive summary

Demand is **growing** fast.

| Vendor | Share |
|---|---|
| A | 31% |
| B |
";

#[tokio::test]
async fn market_preset_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = AppConfig::default();
    cfg.executor.progress_bar = false;
    cfg.search.min_interval_ms = 0;
    cfg.report.language = "English".into();

    let generation = Arc::new(ScriptedGenerationService::new().respond("write_report", REPORT));
    let search = Arc::new(build_search_gateway(&cfg.search, Arc::new(StaticSearch)));
    let engine = assemble_engine(&cfg, "none", generation.clone(), Some(search));
    let job = ReportJob::new(
        engine,
        RenderSettings {
            output_dir: dir.path().join("out"),
            artifacts_dir: dir.path().join("charts"),
            ..RenderSettings::from(&cfg.output)
        },
    );

    let preset = Preset::Market;
    let vars = Variables::new()
        .with("sector", "robotics")
        .with("region", "EU")
        .with("company", "Acme");
    let title = preset.title(&vars, None);
    let request = ReportRequest {
        pipeline: preset.pipeline(&cfg.report).unwrap(),
        context: ExecutionContext::new(vars),
        file_stem: file_stem(&title),
        title,
        subtitle: None,
        charts: preset.charts(&cfg.report),
    };

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        job.run(request, &CancellationToken::new()),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(
        generation.called_task_ids(),
        vec!["collect_data", "analyse_trends", "write_report"]
    );

    let research = generation.prompt_for("collect_data").unwrap();
    assert!(research
        .research_notes
        .iter()
        .any(|n| n.contains("Robotics demand grew 14%")));
    assert!(research
        .research_notes
        .iter()
        .any(|n| n.contains("Vendor A holds 31%")));
    assert!(research.description.ends_with("Write your answer in English."));

    let writer = generation.prompt_for("write_report").unwrap();
    assert!(writer.research_notes.is_empty());
    assert!(writer.transcript.contains("output of collect_data"));
    assert!(writer.transcript.contains("output of analyse_trends"));

    let path = &outcome.rendered.document_path;
    assert!(path.ends_with("market_analysis_report_robotics.html"));
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("Market analysis report: robotics"));
    assert_eq!(html.matches("data:image/svg+xml;base64,").count(), 2);
    assert_eq!(outcome.rendered.diagnostics.len(), 1);

    let leftover_charts = std::fs::read_dir(dir.path().join("charts")).unwrap().count();
    assert_eq!(leftover_charts, 0);
}
