//! The canonical document model.
//!
//! A document is a versioned, ordered sequence of typed sections. Every other
//! representation (plain text, editor markup, JSON) is converted to and from
//! this model; see `../formats`.

pub mod events;
pub mod nodes;

pub use nodes::{
    DocumentJson, DocumentSection, DocumentVersion, FormattedRun, Formatting, HeadingLevel,
    SectionId, SectionKind,
};
