//! Core data structures for the document model.
//!
//! The serde representation of these types is the persisted JSON form:
//!
//! ```text
//! {
//!   "version": "1.0",
//!   "sections": [
//!     { "id": "…", "type": "heading", "level": 1, "content": "Summary" },
//!     { "id": "…", "type": "paragraph", "content": "…", "formattedContent": [ … ] },
//!     { "id": "…", "type": "list", "items": ["…"], "formattedItems": [[ … ]] }
//!   ]
//! }
//! ```

use crate::common::flat_to_model::events_to_document;
use crate::common::model_to_flat::document_to_events;
use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a section, unique within its document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    /// Generate a fresh identifier (random v4 UUID, never reused).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Heading level, restricted to 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MAX: u8 = 3;

    pub fn new(level: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&level).then_some(Self(level))
    }

    /// Map any heading depth onto the supported range (h4-h6 become level 3).
    pub fn clamped(level: usize) -> Self {
        Self(level.clamp(1, Self::MAX as usize) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("heading level {value} is outside 1..=3"))
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.0
    }
}

/// Inline formatting flags. Only bold is modelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
}

/// A span of text sharing the same formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<Formatting>,
}

impl FormattedRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            formatting: None,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            formatting: Some(Formatting { bold: Some(true) }),
        }
    }

    /// Build a run with the given weight, using `None` formatting for plain text.
    pub fn with_bold(text: impl Into<String>, bold: bool) -> Self {
        if bold {
            Self::bold(text)
        } else {
            Self::plain(text)
        }
    }

    pub fn is_bold(&self) -> bool {
        self.formatting
            .as_ref()
            .and_then(|formatting| formatting.bold)
            .unwrap_or(false)
    }
}

/// The typed payload of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SectionKind {
    Heading {
        level: HeadingLevel,
        content: String,
    },
    Paragraph {
        content: String,
        #[serde(
            rename = "formattedContent",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        formatted_content: Option<Vec<FormattedRun>>,
    },
    List {
        items: Vec<String>,
        #[serde(
            rename = "formattedItems",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        formatted_items: Option<Vec<Vec<FormattedRun>>>,
    },
}

impl SectionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SectionKind::Heading { .. } => "heading",
            SectionKind::Paragraph { .. } => "paragraph",
            SectionKind::List { .. } => "list",
        }
    }
}

/// A single block of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub id: SectionId,
    #[serde(flatten)]
    pub kind: SectionKind,
}

impl DocumentSection {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            id: SectionId::generate(),
            kind,
        }
    }

    pub fn with_id(id: impl Into<SectionId>, kind: SectionKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn heading(level: HeadingLevel, content: impl Into<String>) -> Self {
        Self::new(SectionKind::Heading {
            level,
            content: content.into(),
        })
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(SectionKind::Paragraph {
            content: content.into(),
            formatted_content: None,
        })
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SectionKind::List {
            items: items.into_iter().map(Into::into).collect(),
            formatted_items: None,
        })
    }
}

/// Forward-compatibility tag of the persisted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentVersion {
    #[default]
    #[serde(rename = "1.0")]
    V1_0,
}

impl DocumentVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentVersion::V1_0 => "1.0",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "1.0" => Some(DocumentVersion::V1_0),
            _ => None,
        }
    }
}

/// The root of a document: a version tag and the sections in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentJson {
    pub version: DocumentVersion,
    pub sections: Vec<DocumentSection>,
}

impl DocumentJson {
    pub fn new(sections: Vec<DocumentSection>) -> Self {
        Self {
            version: DocumentVersion::default(),
            sections,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, id: &SectionId) -> Option<&DocumentSection> {
        self.sections.iter().find(|section| &section.id == id)
    }

    /// Compare version and section kinds in order, ignoring section ids.
    pub fn same_structure(&self, other: &DocumentJson) -> bool {
        self.version == other.version
            && self.sections.len() == other.sections.len()
            && self
                .sections
                .iter()
                .zip(&other.sections)
                .all(|(a, b)| a.kind == b.kind)
    }

    /// Check the model invariants: ids are non-empty and unique, formatted
    /// runs agree with the plain content they decorate, and every section is
    /// in the normal form the converters produce (so its markup projection
    /// reads back to the same section).
    pub fn validate(&self) -> Result<(), FormatError> {
        let mut seen = HashSet::new();
        for (index, section) in self.sections.iter().enumerate() {
            if section.id.is_empty() {
                return Err(FormatError::InvalidDocument(format!(
                    "section {index} has an empty id"
                )));
            }
            if !seen.insert(&section.id) {
                return Err(FormatError::InvalidDocument(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }
            validate_kind(&section.id, &section.kind)?;
            validate_normal_form(section)?;
        }
        Ok(())
    }
}

fn validate_kind(id: &SectionId, kind: &SectionKind) -> Result<(), FormatError> {
    match kind {
        SectionKind::Heading { .. } => Ok(()),
        SectionKind::Paragraph {
            content,
            formatted_content: Some(runs),
        } => {
            if runs_text(runs) != *content {
                return Err(FormatError::InvalidDocument(format!(
                    "formatted content of section '{id}' does not match its content"
                )));
            }
            Ok(())
        }
        SectionKind::Paragraph { .. } => Ok(()),
        SectionKind::List {
            items,
            formatted_items: Some(formatted),
        } => {
            if items.len() != formatted.len() {
                return Err(FormatError::InvalidDocument(format!(
                    "section '{id}' has {} items but {} formatted items",
                    items.len(),
                    formatted.len()
                )));
            }
            for (position, (item, runs)) in items.iter().zip(formatted).enumerate() {
                if runs_text(runs) != *item {
                    return Err(FormatError::InvalidDocument(format!(
                        "formatted item {position} of section '{id}' does not match its text"
                    )));
                }
            }
            Ok(())
        }
        SectionKind::List { .. } => Ok(()),
    }
}

/// Rebuilding a section from its own event stream must give it back unchanged.
/// This rejects empty blocks and items, untrimmed text, whitespace runs, line
/// breaks outside paragraphs and unmerged runs.
fn validate_normal_form(section: &DocumentSection) -> Result<(), FormatError> {
    let single = DocumentJson::new(vec![section.clone()]);
    let rebuilt = events_to_document(&document_to_events(&single))
        .map_err(|err| FormatError::InvalidDocument(err.to_string()))?;
    match rebuilt.sections.first() {
        None => Err(FormatError::InvalidDocument(format!(
            "section '{}' has no content",
            section.id
        ))),
        Some(normal) if normal.kind != section.kind => {
            Err(FormatError::InvalidDocument(format!(
                "section '{}' is not in normal form (expected {:?})",
                section.id, normal.kind
            )))
        }
        Some(_) => Ok(()),
    }
}

/// Collapse every whitespace run (including `&nbsp;` and tabs) into a single
/// space. Text in the model never holds any other whitespace besides the
/// `\n` of a paragraph line break.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Concatenate the text of a run sequence.
pub fn runs_text(runs: &[FormattedRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}
