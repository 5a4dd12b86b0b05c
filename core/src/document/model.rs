use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::markdown::TextRun;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub subtitle: Option<String>,
    pub run_id: String,
    pub generated_at: DateTime<Local>,
}

impl DocumentMetadata {
    pub fn new(title: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            run_id: run_id.into(),
            generated_at: Local::now(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: Option<String>) -> Self {
        self.subtitle = subtitle.filter(|s| !s.trim().is_empty());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphStyle {
    Normal,
    Bullet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub source: PathBuf,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    /// Fixed display width.
    pub width_px: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocElement {
    /// Level 1 is title-level; 2 and 3 are subheadings.
    Heading { level: u8, text: String },
    Paragraph {
        runs: Vec<TextRun>,
        style: ParagraphStyle,
    },
    /// Header row is rendered bold; every row has `header.len()` cells.
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Image(EmbeddedImage),
    Rule,
}

/// Rendered report. Built once by the renderer, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct OutputDocument {
    metadata: DocumentMetadata,
    elements: Vec<DocElement>,
}

impl OutputDocument {
    pub(crate) fn new(metadata: DocumentMetadata, elements: Vec<DocElement>) -> Self {
        Self { metadata, elements }
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn elements(&self) -> &[DocElement] {
        &self.elements
    }

    pub fn tables(&self) -> impl Iterator<Item = (&Vec<String>, &Vec<Vec<String>>)> {
        self.elements.iter().filter_map(|e| match e {
            DocElement::Table { header, rows } => Some((header, rows)),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &EmbeddedImage> {
        self.elements.iter().filter_map(|e| match e {
            DocElement::Image(img) => Some(img),
            _ => None,
        })
    }
}
