//! Structural document synchronization
//!
//!     This crate keeps three views of one structured document in agreement: the canonical
//!     document model, the markup an editing widget displays, and a persisted JSON copy. A
//!     plain-text form is used for initial input and export.
//!
//!     This is a pure lib: it powers docsync-cli but is shell agnostic, no code here prints,
//!     reads env vars or spawns timers. Time enters the sync engine through the `Clock` trait and
//!     persistence through the `PersistenceSink` trait.
//!
//! Architecture
//!
//!     The format specific code only maps between a concrete syntax and a flat event stream
//!     (./model/events.rs). All of the structure building and normalization lives in one place
//!     (./common/flat_to_model.rs), and its inverse (./common/model_to_flat.rs) feeds the
//!     serializers. This keeps the normal form of the model identical no matter which format
//!     the document came from.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── model                   # Document model and event stream
//!     ├── common                  # Events ⇄ model
//!     ├── formats
//!     │   ├── text                # Plain text with # headings and bullets
//!     │   ├── html                # Widget markup, compatibility check
//!     │   └── json                # Persisted form
//!     ├── sync                    # Sync engine, debounce, persistence
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     └── <area>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Round Trips
//!
//!     Both text and markup round trips are stable up to whitespace: converting a model out and
//!     back in yields a structurally equal model. The markup round trip also keeps section ids,
//!     carried in `data-id` attributes.

pub mod common;
pub mod error;
pub mod format;
pub mod formats;
pub mod model;
pub mod registry;
pub mod sync;

pub use error::{FormatError, Incompatibility};
pub use format::Format;
pub use formats::html::{validate_markup_compatibility, MarkupContent};
pub use model::{DocumentJson, DocumentSection, FormattedRun, HeadingLevel, SectionId, SectionKind};
pub use registry::FormatRegistry;

use formats::text::TextOptions;

/// Parse plain text into a document. Never fails: every line is either a
/// heading, a bullet or paragraph text.
pub fn text_to_json(text: &str) -> DocumentJson {
    formats::text::parse_text(text)
}

/// Export a document as plain text with the default bullet marker.
pub fn json_to_text(doc: &DocumentJson) -> String {
    formats::text::serialize_text(doc, &TextOptions::default())
}

/// Render a document as widget markup.
pub fn json_to_html(doc: &DocumentJson) -> Result<String, FormatError> {
    formats::html::serialize_html(doc)
}

/// Convert widget markup into a document, validating it first.
pub fn html_to_json(markup: &str) -> Result<DocumentJson, FormatError> {
    formats::html::parse_html(markup)
}
