use std::path::PathBuf;

use serde::Serialize;

/// A span of text with flat emphasis flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: true,
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic
    }
}

/// Concatenated text of `runs`.
pub fn runs_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Rows always have exactly `header.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    pub fn columns(&self) -> usize {
        self.header.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuralBlock {
    /// `level` is 1..=3.
    Heading { level: u8, text: String },
    Paragraph { runs: Vec<TextRun> },
    ListItem { text: String, runs: Vec<TextRun> },
    Table(TableBlock),
    ImageRef { path: PathBuf },
    CodeBlock { raw: String },
    Separator,
}

impl StructuralBlock {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn paragraph(runs: Vec<TextRun>) -> Self {
        Self::Paragraph { runs }
    }

    pub fn list_item(runs: Vec<TextRun>) -> Self {
        Self::ListItem {
            text: runs_text(&runs),
            runs,
        }
    }

    /// Visible text of the block; empty for images, code and separators.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Heading { text, .. } | Self::ListItem { text, .. } => text.clone(),
            Self::Paragraph { runs } => runs_text(runs),
            Self::Table(table) => table.header.join(" | "),
            Self::ImageRef { .. } | Self::CodeBlock { .. } | Self::Separator => String::new(),
        }
    }
}
