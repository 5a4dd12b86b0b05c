use dossier_core::diagnostics::{DiagnosticKind, DiagnosticSummary};
use dossier_core::document::{DocumentMetadata, DocumentRenderer, HtmlWriter};
use dossier_core::markdown::{parse, to_markdown, StructuralBlock, TableBlock, TextRun};
use pretty_assertions::assert_eq;

#[test]
fn short_table_row_is_padded() {
    let out = parse("| A | B |\n|---|---|\n| 1 |\n");
    assert_eq!(
        out.blocks,
        vec![StructuralBlock::Table(TableBlock {
            header: vec!["A".into(), "B".into()],
            rows: vec![vec!["1".into(), "".into()]],
        })]
    );
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].kind, DiagnosticKind::TableRepaired);
}

#[test]
fn heading_paragraph_and_bullets() {
    let out = parse("# Title\n\nSome **bold** text.\n\n- item one\n- item two\n");
    assert_eq!(
        out.blocks,
        vec![
            StructuralBlock::heading(1, "Title"),
            StructuralBlock::paragraph(vec![
                TextRun::plain("Some "),
                TextRun::bold("bold"),
                TextRun::plain(" text."),
            ]),
            StructuralBlock::list_item(vec![TextRun::plain("item one")]),
            StructuralBlock::list_item(vec![TextRun::plain("item two")]),
        ]
    );
    assert!(out.diagnostics.is_empty());
}

#[test]
fn parse_is_idempotent_on_its_rendering() {
    let source = "\
## Market *overview*

The **cloud** market grew 20% in 2024.

* first point
+ second point with `code`

| Region | Share | Notes |
|:-------|------:|-------|
| EU | 30% |
| US | 45% | leader | extra |
";
    let first = parse(source).blocks;
    let second = parse(&to_markdown(&first)).blocks;
    assert_eq!(first, second);
    assert_eq!(to_markdown(&second), to_markdown(&first));
}

#[test]
fn rendered_tables_match_header_width() {
    let source = "| A | B | C |\n|---|---|---|\n| 1 |\n| 1 | 2 | 3 | 4 |\n| x | y | z |\n";
    let out = parse(source);
    let rendered = DocumentRenderer::default().render(out.blocks, DocumentMetadata::new("t", "r"));

    let mut tables = 0;
    for (header, rows) in rendered.document.tables() {
        tables += 1;
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.len() == header.len()));
    }
    assert_eq!(tables, 1);
    assert_eq!(
        DiagnosticSummary::from_diagnostics(&out.diagnostics).to_string(),
        "1 table repaired"
    );
}

#[test]
fn html_document_carries_structure() {
    let out = parse("# Report\n\n## Findings\n\n- **Key** point\n\n| K | V |\n|---|---|\n| a | b |\n");
    let rendered = DocumentRenderer::default().render(
        out.blocks,
        DocumentMetadata::new("Market analysis report: cloud", "run-7"),
    );
    let html = HtmlWriter.to_html(&rendered.document);

    assert!(html.contains("<h1>Report</h1>"));
    assert!(html.contains("<h2>Findings</h2>"));
    assert!(html.contains("<li><strong>Key</strong> point</li>"));
    assert!(html.contains("<th>K</th>"));
    assert!(html.contains("<td>b</td>"));
}
