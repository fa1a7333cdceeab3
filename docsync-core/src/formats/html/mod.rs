//! HTML format implementation
//!
//! This module implements bidirectional conversion between the document model
//! and the markup an editing widget works with.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` ecosystem for both directions:
//! the parser repairs malformed input the way a browser does, which matches
//! what a widget hands us, and the serializer takes care of escaping.
//!
//! # Element Mapping Table
//!
//! | Model           | HTML export                     | HTML import                          |
//! |-----------------|---------------------------------|--------------------------------------|
//! | Heading (1-3)   | `<h1>`..`<h3 data-id="…">`      | `<h1>`..`<h6>`, h4-h6 clamp to 3     |
//! | Paragraph       | `<p data-id="…">`               | `<p>`, or stray top-level inline text|
//! | List            | `<ul data-id="…">`              | `<ul>` or `<ol>`                     |
//! | List item       | `<li>`                          | `<li>` (inner `<p>` flattened)       |
//! | Bold run        | `<strong>`                      | `<strong>` or `<b>`                  |
//! | Line break      | `<br>`                          | `<br>`: `\n` in paragraphs, a space elsewhere |
//!
//! Everything else is rejected by [`validate_markup_compatibility`] before
//! conversion starts.
//!
//! # Lossy Conversions
//!
//! - `h4`-`h6` become level 3 headings
//! - ordered lists become unordered lists
//! - whitespace runs (including `&nbsp;`) collapse to one space
//! - bold inside headings is dropped

mod compat;
mod dom;
mod parser;
mod serializer;

pub use compat::validate_markup_compatibility;
pub use parser::{parse_html, parse_markup, MarkupContent};
pub use serializer::serialize_html;

use crate::error::FormatError;
use crate::format::Format;
use crate::model::DocumentJson;

/// Format implementation for HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFormat;

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML fragment for editing widgets"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<DocumentJson, FormatError> {
        parse_html(source)
    }

    fn serialize(&self, doc: &DocumentJson) -> Result<String, FormatError> {
        serialize_html(doc)
    }
}
