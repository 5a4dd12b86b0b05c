//! Market analysis: researcher → trend analyst → report writer.
use std::sync::Arc;

use dossier_core::config::ReportConfig;
use dossier_core::error::ExecutorError;
use dossier_core::pipeline::{AgentDescriptor, Capability, Pipeline, TaskDescriptor, Variables};

use super::literal;

pub const VARIABLES: &[&str] = &["sector", "region", "company"];

pub fn pipeline(report: &ReportConfig) -> Result<Pipeline, ExecutorError> {
    let researcher = Arc::new(
        AgentDescriptor::new(
            "Market Researcher",
            "Collect complete data on {sector} in {region} for {company}, covering supply and \
             demand, competitors, costs, market forces, strengths, economic indicators, ESG and risks.",
            "Experienced strategic sourcing analyst specialised in market data.",
        )
        .with_capability(Capability::WebSearch)
        .with_capability(Capability::WebScrape),
    );
    let analyst = Arc::new(
        AgentDescriptor::new(
            "Trend Analyst",
            "Analyse {sector} data to produce insights including SWOT, Porter's five forces, \
             TCO, landed price, cost breakdown, should-cost and ESG trends.",
            "Procurement strategy and negotiation specialist focused on actionable insights.",
        )
        .with_capability(Capability::WebSearch),
    );
    let writer = Arc::new(AgentDescriptor::new(
        "Report Writer",
        "Write a detailed Markdown report on {sector}.",
        "Professional writer who turns complex data into strategic reports.",
    ));

    let research = TaskDescriptor::new(
        "collect_data",
        "Collect data on {sector} in {region} for {company}, including:\n\
         1. Supply and demand overview (global and regional).\n\
         2. Top 20 competitors by revenue (2024 or most recent).\n\
         3. Contracting models (pay-as-you-go, reserved, ...).\n\
         4. Cost structure and price trends over the last 24 months.\n\
         5. Cost breakdown, should-cost, TCO, landed price, SLAs and penalties.\n\
         6. Supply chain details (producers, logistics, import dependency).\n\
         7. ESG practices and trends.\n\
         8. Risks (geopolitical, regulatory, ...) and opportunities.\n\
         9. Estimate missing data from recent trends.",
        "Structured raw data for every requested element.",
        researcher,
    );
    let analysis = TaskDescriptor::new(
        "analyse_trends",
        "Analyse the {sector} data to produce:\n\
         1. A SWOT analysis with numeric scores per quadrant.\n\
         2. Porter's five forces with numeric scores per force.\n\
         3. A TCO model and landed price formula.\n\
         4. Risk assessment and mitigation strategies.\n\
         5. Negotiation levers and BATNA.\n\
         6. The best negotiation window given seasonality.",
        "Markdown text with analytical insights.",
        analyst,
    )
    .depends_on("collect_data");

    let sections = report
        .sections
        .iter()
        .map(|s| literal(s))
        .collect::<Vec<_>>()
        .join(", ");
    let report_task = TaskDescriptor::new(
        "write_report",
        format!(
            "Write a {words}-word Markdown report on {{sector}} covering every section: {sections}.\n\
             Include tables and actionable recommendations.\n\
             Be detailed: at least {pages} pages.\n\
             Base it on current data with 12-18 month projections.\n\
             Return only the complete Markdown content of the report.",
            words = report.word_count,
            pages = report.min_pages,
        ),
        "The complete report in Markdown.",
        writer,
    )
    .depends_on("analyse_trends");

    Pipeline::builder("market")
        .task(research)
        .task(analysis)
        .task(report_task)
        .build()
}

pub fn title(vars: &Variables) -> String {
    format!(
        "Market analysis report: {}",
        vars.get("sector").unwrap_or("unspecified sector")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::error::TemplateError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_market_order_and_bindings() {
        let pipeline = pipeline(&ReportConfig::default()).unwrap();
        assert_eq!(
            pipeline.execution_order(),
            vec!["collect_data", "analyse_trends", "write_report"]
        );

        let vars = Variables::new()
            .with("sector", "robotics")
            .with("region", "EU")
            .with("company", "Acme");
        pipeline.check_bindings(&vars).unwrap();

        let err = pipeline
            .check_bindings(&Variables::new().with("sector", "robotics"))
            .unwrap_err();
        let TemplateError::UnboundPlaceholder { name, .. } = err;
        assert!(name == "region" || name == "company");
    }

    #[test]
    fn test_report_task_uses_report_config() {
        let report = ReportConfig {
            word_count: 4000,
            sections: vec!["Summary {draft}".into(), "Risks".into()],
            ..ReportConfig::default()
        };
        let pipeline = pipeline(&report).unwrap();
        let task = pipeline.task("write_report").unwrap();
        let rendered = task
            .render(&Variables::new().with("sector", "robotics"))
            .unwrap();
        assert!(rendered.description.starts_with("Write a 4000-word Markdown report on robotics"));
        assert!(rendered.description.contains("Summary {draft}, Risks"));
    }

    #[test]
    fn test_title() {
        assert_eq!(
            title(&Variables::new().with("sector", "robotics")),
            "Market analysis report: robotics"
        );
    }
}
