//! Plain text format implementation
//!
//! The plain-text form is what gets exported and what initial documents are
//! typed or pasted in as. Structure is expressed with line prefixes:
//!
//! | Model     | Text                     |
//! |-----------|--------------------------|
//! | Heading   | `# `, `## `, `### `      |
//! | Paragraph | consecutive plain lines  |
//! | List      | lines starting `- `, `• ` or `* ` |
//!
//! Round trips are stable up to whitespace: for any input `s`,
//! `parse(serialize(parse(s)))` has the same structure as `parse(s)`.
//! Bold formatting has no text representation and is dropped on export.

mod parser;
mod serializer;

pub use parser::parse_text;
pub use serializer::serialize_text;

use crate::error::FormatError;
use crate::format::Format;
use crate::model::DocumentJson;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Marker written in front of each list item on export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum BulletMarker {
    #[default]
    #[serde(rename = "-")]
    Dash,
    #[serde(rename = "•")]
    Dot,
    #[serde(rename = "*")]
    Star,
}

impl BulletMarker {
    pub fn as_char(self) -> char {
        match self {
            BulletMarker::Dash => '-',
            BulletMarker::Dot => '•',
            BulletMarker::Star => '*',
        }
    }
}

impl FromStr for BulletMarker {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "-" => Ok(BulletMarker::Dash),
            "•" => Ok(BulletMarker::Dot),
            "*" => Ok(BulletMarker::Star),
            _ => Err(FormatError::NotSupported(format!(
                "bullet marker '{value}' (expected '-', '•' or '*')"
            ))),
        }
    }
}

/// Options for plain text serialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextOptions {
    pub bullet_marker: BulletMarker,
}

/// Format implementation for plain text
#[derive(Debug, Clone, Default)]
pub struct TextFormat {
    options: TextOptions,
}

impl TextFormat {
    pub fn new(options: TextOptions) -> Self {
        Self { options }
    }
}

impl Format for TextFormat {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Plain text with # headings and bullet lists"
    }

    fn file_extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<DocumentJson, FormatError> {
        Ok(parse_text(source))
    }

    fn serialize(&self, doc: &DocumentJson) -> Result<String, FormatError> {
        Ok(serialize_text(doc, &self.options))
    }

    fn serialize_with_options(
        &self,
        doc: &DocumentJson,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let mut text_options = self.options.clone();
        for (key, value) in options {
            match key.as_str() {
                "bullet-marker" => {
                    text_options.bullet_marker = value.parse()?;
                }
                other => {
                    return Err(FormatError::NotSupported(format!(
                        "Format 'text' does not support parameter '{other}'"
                    )));
                }
            }
        }
        Ok(serialize_text(doc, &text_options))
    }
}
