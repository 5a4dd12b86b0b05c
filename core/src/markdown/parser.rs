use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use crate::diagnostics::{Diagnostic, DiagnosticKind};

use super::inline::{parse_inline, plain_text};
use super::types::{StructuralBlock, TableBlock};

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Emit `Separator` for horizontal rules instead of discarding them.
    pub keep_separators: bool,
}

/// Blocks and diagnostics of one complete parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    pub blocks: Vec<StructuralBlock>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Line-oriented parser for generated Markdown.
///
/// [`MarkdownParser::blocks`] returns a fresh lazy iterator on every call, so
/// the same text can be walked any number of times with identical results.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownParser<'a> {
    text: &'a str,
    options: ParseOptions,
}

impl<'a> MarkdownParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn blocks(&self) -> Blocks<'a> {
        Blocks {
            lines: self.text.lines().enumerate().peekable(),
            state: State::Normal,
            options: self.options,
            diagnostics: Vec::new(),
        }
    }

    pub fn parse(&self) -> ParseOutput {
        let mut blocks = self.blocks();
        let collected: Vec<StructuralBlock> = blocks.by_ref().collect();
        ParseOutput {
            blocks: collected,
            diagnostics: blocks.into_diagnostics(),
        }
    }
}

enum State {
    Normal,
    InCodeBlock {
        fence: String,
        start_line: usize,
        raw: Vec<String>,
    },
    InTable(TableBuilder),
}

/// Lazy block iterator; diagnostics accumulate as blocks are produced.
pub struct Blocks<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    state: State,
    options: ParseOptions,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Blocks<'a> {
    /// Diagnostics for the blocks yielded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Classify one line in `Normal` state. `None` means the line produced no
    /// block by itself (discarded, or it switched state).
    fn classify(&mut self, line_no: usize, line: &str) -> Option<StructuralBlock> {
        let trimmed = line.trim();

        if let Some(fence) = fence_marker(trimmed) {
            self.state = State::InCodeBlock {
                fence,
                start_line: line_no,
                raw: Vec::new(),
            };
            return None;
        }

        if trimmed.is_empty() {
            return None;
        }

        if is_horizontal_rule(trimmed) {
            return self
                .options
                .keep_separators
                .then_some(StructuralBlock::Separator);
        }

        if is_image_line(trimmed) {
            self.diagnostics.push(Diagnostic::at_line(
                DiagnosticKind::ImageDropped,
                line_no,
                format!("image embed '{trimmed}' removed"),
            ));
            return None;
        }

        if trimmed.starts_with('|') {
            let mut table = TableBuilder::new(line_no);
            table.push(trimmed, line_no, &mut self.diagnostics);
            self.state = State::InTable(table);
            return None;
        }

        if let Some((level, text)) = heading(trimmed) {
            let text = plain_text(text, line_no, &mut self.diagnostics);
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            return Some(StructuralBlock::heading(level, text));
        }

        if let Some(item) = bullet(trimmed) {
            let runs = parse_inline(item, line_no, &mut self.diagnostics);
            return Some(StructuralBlock::list_item(runs));
        }

        let runs = parse_inline(trimmed, line_no, &mut self.diagnostics);
        if runs.is_empty() {
            return None;
        }
        Some(StructuralBlock::paragraph(runs))
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = StructuralBlock;

    fn next(&mut self) -> Option<StructuralBlock> {
        loop {
            match std::mem::replace(&mut self.state, State::Normal) {
                State::Normal => {
                    let (idx, line) = self.lines.next()?;
                    if let Some(block) = self.classify(idx + 1, line) {
                        return Some(block);
                    }
                }
                State::InCodeBlock {
                    fence,
                    start_line,
                    mut raw,
                } => match self.lines.next() {
                    None => {
                        self.diagnostics.push(Diagnostic::at_line(
                            DiagnosticKind::UnterminatedFence,
                            start_line,
                            format!("code fence '{fence}' never closed"),
                        ));
                        return Some(StructuralBlock::CodeBlock {
                            raw: raw.join("\n"),
                        });
                    }
                    Some((_, line)) if closes_fence(line.trim(), &fence) => {
                        return Some(StructuralBlock::CodeBlock {
                            raw: raw.join("\n"),
                        });
                    }
                    Some((_, line)) => {
                        raw.push(line.to_string());
                        self.state = State::InCodeBlock {
                            fence,
                            start_line,
                            raw,
                        };
                    }
                },
                State::InTable(mut table) => {
                    let continues = self
                        .lines
                        .peek()
                        .is_some_and(|(_, line)| line.trim().starts_with('|'));
                    if continues {
                        if let Some((idx, line)) = self.lines.next() {
                            table.push(line.trim(), idx + 1, &mut self.diagnostics);
                        }
                        self.state = State::InTable(table);
                    } else if let Some(block) = table.finish(&mut self.diagnostics) {
                        return Some(block);
                    }
                }
            }
        }
    }
}

struct TableBuilder {
    start_line: usize,
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    aligned: bool,
}

impl TableBuilder {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            header: None,
            rows: Vec::new(),
            aligned: false,
        }
    }

    /// Separator lines are skipped before the header and once right after it.
    /// Any later dash-only line such as `| - | - |` is a data row.
    fn push(&mut self, line: &str, line_no: usize, diagnostics: &mut Vec<Diagnostic>) {
        if !self.aligned && is_table_separator(line) {
            self.aligned = self.header.is_some();
            return;
        }
        if self.header.is_some() {
            self.aligned = true;
        }
        let cells: Vec<String> = split_row(line)
            .iter()
            .map(|cell| plain_text(cell, line_no, diagnostics).trim().to_string())
            .collect();
        match self.header {
            None => self.header = Some(cells),
            Some(_) => self.rows.push(cells),
        }
    }

    /// Pad or truncate every row to the header width. Rows are never dropped.
    fn finish(self, diagnostics: &mut Vec<Diagnostic>) -> Option<StructuralBlock> {
        let header = self.header?;
        let width = header.len();
        let mut padded = 0;
        let mut truncated = 0;

        let rows = self
            .rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    padded += 1;
                    row.resize(width, String::new());
                } else if row.len() > width {
                    truncated += 1;
                    row.truncate(width);
                }
                row
            })
            .collect();

        if padded + truncated > 0 {
            diagnostics.push(Diagnostic::at_line(
                DiagnosticKind::TableRepaired,
                self.start_line,
                format!(
                    "table with {width} columns: {padded} row(s) padded, {truncated} row(s) truncated"
                ),
            ));
        }

        Some(StructuralBlock::Table(TableBlock { header, rows }))
    }
}

/// Split on unescaped `|`, dropping the empty cells produced by enclosing pipes.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = vec![String::new()];
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                if let (Some(cell), Some(pipe)) = (cells.last_mut(), chars.next()) {
                    cell.push('\\');
                    cell.push(pipe);
                }
            }
            '|' => cells.push(String::new()),
            other => {
                if let Some(cell) = cells.last_mut() {
                    cell.push(other);
                }
            }
        }
    }

    if line.starts_with('|') && cells.first().is_some_and(|c| c.trim().is_empty()) {
        cells.remove(0);
    }
    if cells.len() > 1 && cells.last().is_some_and(|c| c.trim().is_empty()) && ends_with_pipe(line) {
        cells.pop();
    }
    if cells.is_empty() {
        cells.push(String::new());
    }
    cells
}

fn ends_with_pipe(line: &str) -> bool {
    line.ends_with('|') && !line.ends_with("\\|")
}

/// Only `-`, `|`, `:` and spaces, with at least one dash.
fn is_table_separator(line: &str) -> bool {
    line.contains('-') && line.chars().all(|c| matches!(c, '-' | '|' | ':' | ' '))
}

fn fence_marker(trimmed: &str) -> Option<String> {
    ["```", "~~~"]
        .into_iter()
        .find(|m| trimmed.starts_with(m))
        .map(str::to_string)
}

fn closes_fence(trimmed: &str, fence: &str) -> bool {
    let fence_char = fence.chars().next().unwrap_or('`');
    trimmed.starts_with(fence) && trimmed.trim_start_matches(fence_char).trim().is_empty()
}

/// `---`, `***`, `___` (spaces allowed between the characters).
fn is_horizontal_rule(trimmed: &str) -> bool {
    let compact: Vec<char> = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && matches!(compact[0], '-' | '*' | '_')
        && compact.iter().all(|&c| c == compact[0])
}

/// A line holding nothing but `![alt](path)`.
fn is_image_line(trimmed: &str) -> bool {
    let Some(rest) = trimmed.strip_prefix("![") else {
        return false;
    };
    let Some(close) = rest.find("](") else {
        return false;
    };
    let target = &rest[close + 2..];
    target.ends_with(')') && !target[..target.len() - 1].contains(')')
}

fn heading(trimmed: &str) -> Option<(u8, &str)> {
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 {
        return None;
    }
    let rest = trimmed[hashes..].strip_prefix(' ')?;

    let without_closing = rest.trim_end_matches('#');
    let text = if without_closing.is_empty() || without_closing.ends_with(' ') {
        without_closing
    } else {
        rest
    };

    Some((hashes.min(3) as u8, text.trim()))
}

fn bullet(trimmed: &str) -> Option<&str> {
    ["- ", "* ", "+ "]
        .into_iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::types::TextRun;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> ParseOutput {
        MarkdownParser::new(text).parse()
    }

    #[test]
    fn test_heading_levels_are_capped() {
        let out = parse("# One\n## Two\n#### Four ##\n#NoSpace");
        assert_eq!(
            out.blocks,
            vec![
                StructuralBlock::heading(1, "One"),
                StructuralBlock::heading(2, "Two"),
                StructuralBlock::heading(3, "Four"),
                StructuralBlock::paragraph(vec![TextRun::plain("#NoSpace")]),
            ]
        );
    }

    #[test]
    fn test_heading_markup_is_stripped() {
        let out = parse("## **Market** *size* for C#");
        assert_eq!(out.blocks, vec![StructuralBlock::heading(2, "Market size for C#")]);
    }

    #[test]
    fn test_bullets_and_rules() {
        let out = parse("- one\n* two\n+ three\n---\n***\n- - -");
        assert_eq!(out.blocks.len(), 3);
        assert!(out
            .blocks
            .iter()
            .all(|b| matches!(b, StructuralBlock::ListItem { .. })));

        let kept = MarkdownParser::new("a\n---\nb")
            .with_options(ParseOptions {
                keep_separators: true,
            })
            .parse();
        assert_eq!(kept.blocks[1], StructuralBlock::Separator);
    }

    #[test]
    fn test_code_fence_is_verbatim() {
        let out = parse("before\n```rust\n# not a heading\n| not | table |\n```\nafter");
        assert_eq!(
            out.blocks,
            vec![
                StructuralBlock::paragraph(vec![TextRun::plain("before")]),
                StructuralBlock::CodeBlock {
                    raw: "# not a heading\n| not | table |".into()
                },
                StructuralBlock::paragraph(vec![TextRun::plain("after")]),
            ]
        );
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_fence_consumes_rest() {
        let out = parse("intro\n~~~\nline 1\n\nline 2");
        assert_eq!(
            out.blocks[1],
            StructuralBlock::CodeBlock {
                raw: "line 1\n\nline 2".into()
            }
        );
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::UnterminatedFence);
        assert_eq!(out.diagnostics[0].line, Some(2));
    }

    #[test]
    fn test_image_lines_are_dropped() {
        let out = parse("![chart](chart.png)\nText");
        assert_eq!(out.blocks.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::ImageDropped);
    }

    #[test]
    fn test_table_with_header_only() {
        let out = parse("| Risk | Impact |\n|:---|---:|");
        assert_eq!(
            out.blocks,
            vec![StructuralBlock::Table(TableBlock {
                header: vec!["Risk".into(), "Impact".into()],
                rows: vec![],
            })]
        );
    }

    #[test]
    fn test_table_cells_strip_markup_and_keep_escaped_pipes() {
        let out = parse("| **Clause** | Note |\n|---|---|\n| 4.1 | a \\| b |\n| x | y | z |");
        let StructuralBlock::Table(table) = &out.blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.header, vec!["Clause", "Note"]);
        assert_eq!(table.rows[0], vec!["4.1", "a | b"]);
        assert_eq!(table.rows[1], vec!["x", "y"]);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::TableRepaired);
    }

    #[test]
    fn test_dash_only_data_rows_are_kept() {
        let out = parse("| Clause | Penalty |\n|---|---|\n| 4.1 | - |\n| - | - |\n| 5.2 | 10% |\n");
        assert_eq!(
            out.blocks,
            vec![StructuralBlock::Table(TableBlock {
                header: vec!["Clause".into(), "Penalty".into()],
                rows: vec![
                    vec!["4.1".into(), "-".into()],
                    vec!["-".into(), "-".into()],
                    vec!["5.2".into(), "10%".into()],
                ],
            })]
        );
        assert!(out.diagnostics.is_empty());

        let first = parse("| A | B |\n|---|---|\n| - | - |\n");
        let StructuralBlock::Table(table) = &first.blocks[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.rows, vec![vec!["-".to_string(), "-".to_string()]]);
    }

    #[test]
    fn test_table_ends_at_first_non_pipe_line() {
        let out = parse("| A |\n| 1 |\nAfter table");
        assert_eq!(out.blocks.len(), 2);
        assert!(matches!(out.blocks[1], StructuralBlock::Paragraph { .. }));
    }

    #[test]
    fn test_blocks_iterator_is_restartable() {
        let parser = MarkdownParser::new("# T\n| a | b |\n| 1 |\n- x");
        let first: Vec<_> = parser.blocks().collect();
        let second: Vec<_> = parser.blocks().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);

        let mut lazy = parser.blocks();
        assert_eq!(lazy.next(), Some(StructuralBlock::heading(1, "T")));
        assert!(lazy.diagnostics().is_empty());
    }
}
