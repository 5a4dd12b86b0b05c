//! Markdown structural parsing.
//!
//! Generated text is classified line by line into [`StructuralBlock`]s by a
//! small state machine (`Normal`, `InCodeBlock`, `InTable`). Problems that do
//! not prevent rendering are reported as diagnostics instead of errors.

mod inline;
mod parser;
mod types;
mod writer;

pub use inline::{parse_inline, plain_text};
pub use parser::{Blocks, MarkdownParser, ParseOptions, ParseOutput};
pub use types::{runs_text, StructuralBlock, TableBlock, TextRun};
pub use writer::to_markdown;

/// Parse `text` with default options.
pub fn parse(text: &str) -> ParseOutput {
    MarkdownParser::new(text).parse()
}
