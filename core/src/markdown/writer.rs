//! Markdown rendering of parsed blocks.
//!
//! Parsing the output again yields the same headings, paragraphs, list items
//! and tables.

use super::types::{StructuralBlock, TableBlock, TextRun};

pub fn to_markdown(blocks: &[StructuralBlock]) -> String {
    let mut out = String::new();
    let mut prev: Option<&StructuralBlock> = None;

    for block in blocks {
        let Some(text) = write_block(block) else {
            continue;
        };
        if let Some(prev) = prev {
            let list_continues = matches!(prev, StructuralBlock::ListItem { .. })
                && matches!(block, StructuralBlock::ListItem { .. });
            out.push_str(if list_continues { "\n" } else { "\n\n" });
        }
        out.push_str(&text);
        prev = Some(block);
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn write_block(block: &StructuralBlock) -> Option<String> {
    match block {
        StructuralBlock::Heading { level, text } => {
            let level = (*level).clamp(1, 3) as usize;
            Some(format!("{} {}", "#".repeat(level), escape(text)))
        }
        StructuralBlock::Paragraph { runs } => {
            let text = write_runs(runs);
            (!text.is_empty()).then(|| escape_line_start(&text))
        }
        StructuralBlock::ListItem { runs, .. } => Some(format!("- {}", write_runs(runs))),
        StructuralBlock::Table(table) => Some(write_table(table)),
        StructuralBlock::ImageRef { path } => Some(format!("![]({})", path.display())),
        StructuralBlock::CodeBlock { raw } => Some(format!("```\n{raw}\n```")),
        StructuralBlock::Separator => Some("---".to_string()),
    }
}

fn write_runs(runs: &[TextRun]) -> String {
    runs.iter().map(write_run).collect()
}

fn write_run(run: &TextRun) -> String {
    let marker = match (run.bold, run.italic) {
        (true, true) => "***",
        (true, false) => "**",
        (false, true) => "*",
        (false, false) => return escape(&run.text),
    };

    let core = run.text.trim();
    if core.is_empty() {
        return escape(&run.text);
    }
    let start = run.text.len() - run.text.trim_start().len();
    let end = run.text.trim_end().len();
    format!(
        "{}{marker}{}{marker}{}",
        &run.text[..start],
        escape(core),
        &run.text[end..]
    )
}

fn write_table(table: &TableBlock) -> String {
    let mut lines = vec![write_row(&table.header)];
    lines.push(format!("|{}", " --- |".repeat(table.columns().max(1))));
    lines.extend(table.rows.iter().map(|r| write_row(r)));
    lines.join("\n")
}

fn write_row(cells: &[String]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
    format!("| {} |", cells.join(" | "))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | '#' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_cell(text: &str) -> String {
    escape(text).replace('-', "\\-")
}

/// Keep a paragraph from being read back as a bullet, rule, table or fence.
fn escape_line_start(text: &str) -> String {
    match text.chars().next() {
        Some('-' | '+' | '~') => format!("\\{text}"),
        _ => text.to_string(),
    }
}
