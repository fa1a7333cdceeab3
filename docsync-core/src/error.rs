//! Error types for format operations

use thiserror::Error;

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    /// The document carries a version tag this crate does not understand
    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(String),
    /// Markup uses structure outside the supported vocabulary
    #[error("Incompatible markup: {0}")]
    IncompatibleMarkup(#[from] Incompatibility),
    /// Markup carried text but converted to a document without sections
    #[error("Markup conversion produced an empty document from non-empty input")]
    DegenerateMarkup,
    /// The document violates a model invariant
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Reasons a markup fragment is rejected by the compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("unsupported element <{0}>")]
    UnsupportedElement(String),
    #[error("event handler attribute '{0}'")]
    EventHandlerAttribute(String),
    #[error("lists nested inside list items are not supported")]
    NestedList,
    #[error("<{element}> is not allowed inside <{parent}>")]
    MisplacedElement { element: String, parent: String },
}
