//! Plain text serialization (model → text)
//!
//! The exact inverse of the parser's line rules: headings get `#` × level,
//! list items get the configured bullet marker, paragraphs are written as-is.
//! Sections are separated by one blank line and the output carries no
//! trailing newline. Inline formatting is not represented in plain text.

use super::TextOptions;
use crate::model::nodes::{DocumentJson, SectionKind};

/// Serialize a document to plain text.
pub fn serialize_text(doc: &DocumentJson, options: &TextOptions) -> String {
    let mut out = String::new();

    for section in &doc.sections {
        match &section.kind {
            SectionKind::Heading { level, content } => {
                out.push_str(&"#".repeat(level.get() as usize));
                out.push(' ');
                out.push_str(content);
                out.push('\n');
            }
            SectionKind::Paragraph { content, .. } => {
                out.push_str(content);
                out.push('\n');
            }
            SectionKind::List { items, .. } => {
                for item in items {
                    out.push(options.bullet_marker.as_char());
                    out.push(' ');
                    out.push_str(item);
                    out.push('\n');
                }
            }
        }
        out.push('\n');
    }

    let len = out.trim_end_matches('\n').len();
    out.truncate(len);
    out
}
