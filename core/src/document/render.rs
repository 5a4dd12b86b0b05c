use std::path::Path;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::markdown::{StructuralBlock, TableBlock};

use super::model::{DocElement, DocumentMetadata, EmbeddedImage, OutputDocument, ParagraphStyle};

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub image_width_px: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { image_width_px: 384 }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub document: OutputDocument,
    pub diagnostics: Vec<Diagnostic>,
}

/// Maps structural blocks onto the output document model.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    options: RenderOptions,
}

impl DocumentRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render<I>(&self, blocks: I, metadata: DocumentMetadata) -> RenderOutput
    where
        I: IntoIterator<Item = StructuralBlock>,
    {
        let mut elements = Vec::new();
        let mut diagnostics = Vec::new();

        for block in blocks {
            match block {
                StructuralBlock::Heading { level, text } => {
                    elements.push(DocElement::Heading {
                        level: level.clamp(1, 3),
                        text,
                    });
                }
                StructuralBlock::Paragraph { runs } => elements.push(DocElement::Paragraph {
                    runs,
                    style: ParagraphStyle::Normal,
                }),
                StructuralBlock::ListItem { runs, .. } => elements.push(DocElement::Paragraph {
                    runs,
                    style: ParagraphStyle::Bullet,
                }),
                StructuralBlock::Table(table) => elements.push(grid_table(table)),
                StructuralBlock::ImageRef { path } => match self.load_image(&path) {
                    Ok(image) => elements.push(DocElement::Image(image)),
                    Err(reason) => {
                        tracing::warn!(
                            target: "dossier.render",
                            path = %path.display(),
                            %reason,
                            "image skipped"
                        );
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::ImageSkipped,
                            format!("image {} skipped: {reason}", path.display()),
                        ));
                    }
                },
                StructuralBlock::CodeBlock { .. } => {}
                StructuralBlock::Separator => elements.push(DocElement::Rule),
            }
        }

        RenderOutput {
            document: OutputDocument::new(metadata, elements),
            diagnostics,
        }
    }

    fn load_image(&self, path: &Path) -> Result<EmbeddedImage, String> {
        let mime = mime_for(path).ok_or_else(|| "unsupported image type".to_string())?;
        let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
        Ok(EmbeddedImage {
            source: path.to_path_buf(),
            mime,
            bytes,
            width_px: self.options.image_width_px,
        })
    }
}

/// Rows are padded or truncated to the header width.
fn grid_table(table: TableBlock) -> DocElement {
    let width = table.header.len();
    let rows = table
        .rows
        .into_iter()
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect();
    DocElement::Table {
        header: table.header,
        rows,
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "svg" => Some("image/svg+xml"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
