//! JSON format implementation
//!
//! The persisted form of the document model (see [`crate::model::nodes`]).
//! Parsing checks the version tag before anything else so that a document
//! written by a newer producer fails with [`FormatError::UnsupportedVersion`]
//! instead of a confusing shape error, then enforces the model invariants.

use crate::error::FormatError;
use crate::format::Format;
use crate::model::{DocumentJson, DocumentVersion};
use serde_json::Value;

/// Parse and validate a persisted document.
pub fn parse_json(source: &str) -> Result<DocumentJson, FormatError> {
    let value: Value = serde_json::from_str(source)
        .map_err(|e| FormatError::ParseError(format!("invalid JSON: {e}")))?;
    parse_value(value)
}

/// Same as [`parse_json`] for an already decoded JSON value.
pub fn parse_value(value: Value) -> Result<DocumentJson, FormatError> {
    match value.get("version") {
        Some(Value::String(tag)) => {
            if DocumentVersion::parse(tag).is_none() {
                return Err(FormatError::UnsupportedVersion(tag.clone()));
            }
        }
        Some(other) => return Err(FormatError::UnsupportedVersion(other.to_string())),
        None => {
            return Err(FormatError::ParseError(
                "document has no version tag".to_string(),
            ))
        }
    }

    let doc: DocumentJson = serde_json::from_value(value)
        .map_err(|e| FormatError::ParseError(format!("invalid document: {e}")))?;
    doc.validate()?;
    Ok(doc)
}

pub fn serialize_json(doc: &DocumentJson) -> Result<String, FormatError> {
    serde_json::to_string_pretty(doc)
        .map_err(|e| FormatError::SerializationError(format!("JSON serialization failed: {e}")))
}

/// Format implementation for the persisted JSON document
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Persisted document model (versioned JSON)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<DocumentJson, FormatError> {
        parse_json(source)
    }

    fn serialize(&self, doc: &DocumentJson) -> Result<String, FormatError> {
        serialize_json(doc)
    }
}
