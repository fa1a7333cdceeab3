//! Defines the flat event stream representation of a document.

use crate::model::nodes::{FormattedRun, HeadingLevel, SectionId};

/// Represents a single event in the document stream.
///
/// Parsers emit a flat sequence of events and the shared builder in
/// `common::flat_to_model` assembles sections from it; serializers walk the
/// stream produced by `common::model_to_flat`. Block start events carry the
/// section id when the source provides one.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartDocument,
    EndDocument,
    StartHeading {
        level: HeadingLevel,
        id: Option<SectionId>,
    },
    EndHeading,
    StartParagraph {
        id: Option<SectionId>,
    },
    EndParagraph,
    StartList {
        id: Option<SectionId>,
    },
    EndList,
    StartListItem,
    EndListItem,
    Inline(FormattedRun),
    /// Hard line break. Kept as `\n` in paragraphs, folded to a space elsewhere.
    LineBreak,
}
