//! Extracted contract text handed to the pipeline.

use std::path::Path;

/// Page-separated document text. Pages are numbered from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    name: Option<String>,
    pages: Vec<String>,
}

const PAGE_BREAK: char = '\u{000C}';

impl SourceDocument {
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }

    /// Split on form feeds, the page separator emitted by common PDF text extractors.
    pub fn from_text(text: &str) -> Self {
        let text = text.strip_suffix(PAGE_BREAK).unwrap_or(text);
        Self::from_pages(text.split(PAGE_BREAK))
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        Ok(Self::from_text(&text).with_name(name))
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }

    /// Prompt text with a `[Page N]` marker before each non-blank page.
    pub fn render(&self) -> String {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| format!("[Page {}]\n{}", i + 1, text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_feeds_split_pages() {
        let doc = SourceDocument::from_text("first page\u{000C}second page\u{000C}");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page(2), Some("second page"));
        assert_eq!(doc.page(0), None);
        assert_eq!(
            doc.render(),
            "[Page 1]\nfirst page\n\n[Page 2]\nsecond page"
        );
    }

    #[test]
    fn test_blank_pages_keep_numbering() {
        let doc = SourceDocument::from_pages(["intro", "  ", "annex"]);
        assert_eq!(doc.render(), "[Page 1]\nintro\n\n[Page 3]\nannex");
        assert!(!doc.is_empty());
        assert!(SourceDocument::from_text(" \u{000C} ").is_empty());
    }

    #[test]
    fn test_from_file_keeps_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lease.txt");
        std::fs::write(&path, "clause 1\u{000C}clause 2").unwrap();

        let doc = SourceDocument::from_file(&path).unwrap();
        assert_eq!(doc.name(), Some("lease.txt"));
        assert_eq!(doc.page_count(), 2);
    }
}
