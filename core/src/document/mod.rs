//! Output document model, renderer and writers.

mod html;
mod model;
mod persist;
mod render;

pub use html::HtmlWriter;
pub use model::{DocElement, DocumentMetadata, EmbeddedImage, OutputDocument, ParagraphStyle};
pub use persist::{persist_document, write_atomic};
pub use render::{DocumentRenderer, RenderOptions, RenderOutput};

/// Serialization of an [`OutputDocument`] to a file format.
pub trait DocumentFormat: Send + Sync {
    fn extension(&self) -> &'static str;
    fn encode(&self, document: &OutputDocument) -> Vec<u8>;
}
