//! Contract analysis: eight clause specialists → report writer.
//!
//! Every task reads the source document, so none of the templates needs
//! invocation variables.
use std::sync::Arc;

use dossier_core::config::ReportConfig;
use dossier_core::error::ExecutorError;
use dossier_core::pipeline::{AgentDescriptor, Pipeline, TaskDescriptor};

use super::literal;

struct Specialist {
    id: &'static str,
    role: &'static str,
    goal: &'static str,
    backstory: &'static str,
    description: &'static str,
    expected_output: &'static str,
}

const SPECIALISTS: &[Specialist] = &[
    Specialist {
        id: "term_and_termination",
        role: "Contract clause analyst",
        goal: "Make sure term, renewal and termination clauses favour the buyer.",
        backstory: "Identifies and evaluates critical contract clauses.",
        description: "Find the clauses on term, automatic renewal and early termination.\n\
                      Assess their risks and benefits for the buyer.\n\
                      Suggest changes that protect the buyer's interests.",
        expected_output: "Detailed list of term, renewal and termination clauses with page citations, \
                          the risks and benefits of each for the buyer, and specific renegotiation recommendations.",
    },
    Specialist {
        id: "obligations",
        role: "Contract obligations specialist",
        goal: "Make sure obligations are clear and enforceable, protecting the buyer from failures.",
        backstory: "Contract lawyer experienced in complex negotiations and the nuances of obligations.",
        description: "Identify and detail the obligations of both parties: deadlines, minimum volumes, \
                      quality, deliveries, SLAs and penalties.\n\
                      Assess how clear and precise they are.\n\
                      Point out areas of conflict or ambiguity.",
        expected_output: "Summary of both parties' obligations, ambiguous or conflicting areas, \
                          and suggestions to clarify them, citing clauses and pages.",
    },
    Specialist {
        id: "financial_terms",
        role: "Contract financial analyst",
        goal: "Make sure financial terms are transparent and advantageous for the buyer.",
        backstory: "Corporate finance background focused on the economic impact of agreed terms.",
        description: "Analyse price adjustment, exchange rate and scope revision clauses.\n\
                      Assess their impact on total cost of ownership (TCO).\n\
                      Suggest protections against unexpected cost increases.",
        expected_output: "Price adjustment, currency and scope clauses with their TCO impact \
                          and proposed safeguards, citing clauses and pages.",
    },
    Specialist {
        id: "sourcing_strategy",
        role: "Sourcing strategy consultant",
        goal: "Make sure the contract keeps strategic sourcing options open for the buyer.",
        backstory: "Strategic procurement background; values supplier diversification and flexibility.",
        description: "Find exclusivity or dependency clauses that could limit future negotiations.\n\
                      Assess their impact on the sourcing strategy.\n\
                      Suggest changes that keep or increase the buyer's flexibility.",
        expected_output: "Exclusivity and dependency clauses, their impact on flexibility, \
                          and recommendations to modify or remove them.",
    },
    Specialist {
        id: "risk_audit",
        role: "Contract risk auditor",
        goal: "Reduce the buyer's exposure to contractual risk.",
        backstory: "Audit and compliance specialist skilled at finding contractual weaknesses.",
        description: "Examine the contract for gaps or ambiguities.\n\
                      Assess the legal or financial risks they create.\n\
                      Recommend corrective measures or additional clauses.",
        expected_output: "Gaps and ambiguities with their potential impact on the buyer \
                          and suggested mitigating clauses.",
    },
    Specialist {
        id: "spend_analysis",
        role: "Spend analysis specialist",
        goal: "Align the contract with spend analysis and cost optimisation practice.",
        backstory: "Economist experienced in corporate spend analysis.",
        description: "Relate the critical points of the contract to spend analysis practice.\n\
                      Assess how the terms shape supply type, frequency, added value and recurrence.\n\
                      Suggest adjustments that optimise spend.",
        expected_output: "Correlation between critical clauses and spend analysis practice, \
                          with recommendations for financial efficiency.",
    },
    Specialist {
        id: "negotiation",
        role: "Contract negotiator",
        goal: "Improve the buyer's position through effective renegotiation.",
        backstory: "Seasoned negotiator who secures the most favourable terms for buyers.",
        description: "Identify clauses and terms open to renegotiation.\n\
                      Propose negotiation strategies to improve them.\n\
                      Give solid arguments for each proposal.",
        expected_output: "Renegotiable clauses, negotiation strategies and supporting arguments.",
    },
    Specialist {
        id: "esg_compliance",
        role: "ESG and compliance analyst for procurement",
        goal: "Assess environmental, social, governance and compliance aspects of the contract.",
        backstory: "Led environmental audits and sustainable procurement programmes at multinationals.",
        description: "Identify environmental, social and compliance impacts, including data protection.\n\
                      Map the sustainable practices the contract requires or enables.",
        expected_output: "Compliance, data protection, environmental and ESG clauses, their conformity \
                          with current regulation, and recommended adjustments.",
    },
];

pub fn pipeline(report: &ReportConfig) -> Result<Pipeline, ExecutorError> {
    let mut builder = Pipeline::builder("contract");
    for s in SPECIALISTS {
        let agent = Arc::new(AgentDescriptor::new(s.role, s.goal, s.backstory));
        builder = builder.task(TaskDescriptor::new(
            s.id,
            literal(s.description),
            s.expected_output,
            agent,
        ));
    }

    let writer = Arc::new(AgentDescriptor::new(
        "Senior contract lawyer and report writer",
        "Produce the final document with a clear structure that procurement managers can act on.",
        "Professional writer of contract reports who always adds the relevant details \
         and structures the text well.",
    ));
    let description = format!(
        "Read the whole source document and compile the specialists' analyses into one report \
         from a strategic procurement perspective.\n\
         Cite the clause and page for every piece of information.\n\
         Cover term and termination, obligations, financial terms and TCO, sourcing flexibility, \
         gaps and risks, spend analysis, renegotiation points and compliance/ESG, \
         one detailed section each.\n\
         Finish with an executive summary (Points of Attention, Improvement Opportunities, \
         Potential Risks) and a summary table of the main contract items: object, penalties, \
         SLAs, signature date, term, specification, price and place of service, obligations, \
         renewal type, price adjustment.\n\
         Aim for at least {pages} pages. Return only Markdown.",
        pages = report.min_pages,
    );
    builder = builder.task(TaskDescriptor::new(
        "write_report",
        literal(&description),
        "A cohesive, professional contract report with executive summary and summary table, \
         citing clauses and pages.",
        writer,
    ));

    builder.build()
}

pub fn title(document_name: Option<&str>) -> String {
    format!("Contract analysis report: {}", document_name.unwrap_or("contract"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::pipeline::Variables;

    #[test]
    fn test_contract_pipeline_needs_no_variables() {
        let pipeline = pipeline(&ReportConfig::default()).unwrap();
        assert_eq!(pipeline.tasks().len(), SPECIALISTS.len() + 1);
        assert_eq!(pipeline.final_task_id(), "write_report");
        assert_eq!(pipeline.execution_order()[0], "term_and_termination");
        pipeline.check_bindings(&Variables::new()).unwrap();
    }

    #[test]
    fn test_title_uses_document_name() {
        assert_eq!(title(Some("supply.pdf")), "Contract analysis report: supply.pdf");
        assert_eq!(title(None), "Contract analysis report: contract");
    }
}
