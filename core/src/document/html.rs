use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::markdown::TextRun;

use super::model::{DocElement, EmbeddedImage, OutputDocument, ParagraphStyle};
use super::DocumentFormat;

const STYLE: &str = "body{font-family:Georgia,serif;max-width:48rem;margin:2rem auto;line-height:1.5;color:#222}\
.title-block{border-bottom:2px solid #444;margin-bottom:2rem}\
.title-block .subtitle{font-style:italic;color:#555}\
.title-block .generated{font-size:.85rem;color:#777}\
table.grid{border-collapse:collapse;width:100%;margin:1rem 0}\
table.grid th,table.grid td{border:1px solid #888;padding:.3rem .5rem;vertical-align:top}\
table.grid th{font-weight:bold;background:#eee}\
figure{text-align:center}";

/// Self-contained HTML: styles inline, images as data URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlWriter;

impl DocumentFormat for HtmlWriter {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn encode(&self, document: &OutputDocument) -> Vec<u8> {
        self.to_html(document).into_bytes()
    }
}

impl HtmlWriter {
    pub fn to_html(&self, document: &OutputDocument) -> String {
        let meta = document.metadata();
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", encode_text(&meta.title)));
        out.push_str("<meta name=\"generator\" content=\"dossier\">\n");
        out.push_str(&format!(
            "<meta name=\"dossier-run-id\" content=\"{}\">\n",
            encode_double_quoted_attribute(&meta.run_id)
        ));
        out.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

        out.push_str("<header class=\"title-block\">\n");
        out.push_str(&format!("<h1 class=\"title\">{}</h1>\n", encode_text(&meta.title)));
        if let Some(subtitle) = &meta.subtitle {
            out.push_str(&format!("<p class=\"subtitle\">{}</p>\n", encode_text(subtitle)));
        }
        out.push_str(&format!(
            "<p class=\"generated\">Generated {}</p>\n</header>\n<main>\n",
            meta.generated_at.format("%Y-%m-%d %H:%M")
        ));

        let mut in_list = false;
        for element in document.elements() {
            let bullet = matches!(
                element,
                DocElement::Paragraph {
                    style: ParagraphStyle::Bullet,
                    ..
                }
            );
            if bullet && !in_list {
                out.push_str("<ul>\n");
            } else if !bullet && in_list {
                out.push_str("</ul>\n");
            }
            in_list = bullet;

            write_element(&mut out, element);
        }
        if in_list {
            out.push_str("</ul>\n");
        }

        out.push_str("</main>\n</body>\n</html>\n");
        out
    }
}

fn write_element(out: &mut String, element: &DocElement) {
    match element {
        DocElement::Heading { level, text } => {
            out.push_str(&format!("<h{level}>{}</h{level}>\n", encode_text(text)));
        }
        DocElement::Paragraph { runs, style } => {
            let tag = match style {
                ParagraphStyle::Normal => "p",
                ParagraphStyle::Bullet => "li",
            };
            out.push_str(&format!("<{tag}>{}</{tag}>\n", write_runs(runs)));
        }
        DocElement::Table { header, rows } => {
            out.push_str("<table class=\"grid\">\n<thead><tr>");
            for cell in header {
                out.push_str(&format!("<th>{}</th>", encode_text(cell)));
            }
            out.push_str("</tr></thead>\n<tbody>\n");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str(&format!("<td>{}</td>", encode_text(cell)));
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n</table>\n");
        }
        DocElement::Image(image) => write_image(out, image),
        DocElement::Rule => out.push_str("<hr>\n"),
    }
}

fn write_runs(runs: &[TextRun]) -> String {
    runs.iter()
        .map(|run| {
            let text = encode_text(&run.text);
            match (run.bold, run.italic) {
                (true, true) => format!("<strong><em>{text}</em></strong>"),
                (true, false) => format!("<strong>{text}</strong>"),
                (false, true) => format!("<em>{text}</em>"),
                (false, false) => text.into_owned(),
            }
        })
        .collect()
}

fn write_image(out: &mut String, image: &EmbeddedImage) {
    let alt = image
        .source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    out.push_str(&format!(
        "<figure><img src=\"data:{};base64,{}\" width=\"{}\" alt=\"{}\"></figure>\n",
        image.mime,
        STANDARD.encode(&image.bytes),
        image.width_px,
        encode_double_quoted_attribute(&alt)
    ));
}
