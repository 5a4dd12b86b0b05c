use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Non-fatal findings while parsing generated Markdown or rendering the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Rows were padded or truncated to the header width.
    TableRepaired,
    /// An image embed in the generated text was removed.
    ImageDropped,
    /// A code fence was never closed.
    UnterminatedFence,
    /// An image reference pointed at a missing or unreadable file.
    ImageSkipped,
    /// Chart data could not be drawn.
    ChartSkipped,
}

impl DiagnosticKind {
    fn label(self, count: usize) -> &'static str {
        let one = count == 1;
        match (self, one) {
            (Self::TableRepaired, true) => "table repaired",
            (Self::TableRepaired, false) => "tables repaired",
            (Self::ImageDropped, true) => "embedded image dropped",
            (Self::ImageDropped, false) => "embedded images dropped",
            (Self::UnterminatedFence, true) => "unterminated code fence",
            (Self::UnterminatedFence, false) => "unterminated code fences",
            (Self::ImageSkipped, true) => "image reference skipped",
            (Self::ImageSkipped, false) => "image references skipped",
            (Self::ChartSkipped, true) => "chart skipped",
            (Self::ChartSkipped, false) => "charts skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based source line, when the finding comes from the Markdown text.
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn at_line(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Counts per kind, printed as "2 tables repaired, 1 image reference skipped".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticSummary {
    counts: BTreeMap<DiagnosticKind, usize>,
}

impl DiagnosticSummary {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut counts = BTreeMap::new();
        for d in diagnostics {
            *counts.entry(d.kind).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

impl fmt::Display for DiagnosticSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.counts.is_empty() {
            return f.write_str("no issues");
        }
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(kind, &n)| format!("{n} {}", kind.label(n)))
            .collect();
        f.write_str(&parts.join(", "))
    }
}
