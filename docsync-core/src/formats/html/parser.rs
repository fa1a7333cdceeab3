//! HTML parsing (markup → model)
//!
//! Pipeline: markup → RcDom → compatibility check → Events → DocumentJson
//!
//! The walk over the body is deliberately forgiving about layout (whitespace
//! text between blocks, stray inline content at the top level) and strict
//! about vocabulary, which the compatibility check has already enforced by
//! the time events are produced.

use super::{compat, dom};
use crate::common::flat_to_model::events_to_document;
use crate::error::FormatError;
use crate::model::events::Event;
use crate::model::nodes::{
    collapse_whitespace, DocumentJson, FormattedRun, HeadingLevel, SectionId,
};
use markup5ever_rcdom::{Handle, NodeData};

/// Classification of a markup fragment coming from an editing widget.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupContent {
    /// The widget holds no text at all, only scaffolding such as
    /// `<p><br></p>`.
    EmptyEditor,
    Document(DocumentJson),
}

impl MarkupContent {
    pub fn into_document(self) -> DocumentJson {
        match self {
            MarkupContent::EmptyEditor => DocumentJson::empty(),
            MarkupContent::Document(doc) => doc,
        }
    }
}

/// Parse markup, telling the empty editor apart from a real document.
///
/// Markup that carries text but yields no section is reported as
/// [`FormatError::DegenerateMarkup`] rather than silently becoming an empty
/// document.
pub fn parse_markup(markup: &str) -> Result<MarkupContent, FormatError> {
    let dom = dom::parse(markup);
    compat::check_dom(&dom)?;

    let Some(body) = dom::body(&dom) else {
        return Ok(MarkupContent::EmptyEditor);
    };
    if !dom::has_text(&body) {
        return Ok(MarkupContent::EmptyEditor);
    }

    let mut walker = EventWalker::default();
    walker.events.push(Event::StartDocument);
    for child in body.children.borrow().iter() {
        walker.block(child);
    }
    walker.close_implicit();
    walker.events.push(Event::EndDocument);

    let doc = events_to_document(&walker.events)
        .map_err(|e| FormatError::ParseError(format!("markup conversion failed: {e}")))?;
    if doc.is_empty() {
        return Err(FormatError::DegenerateMarkup);
    }
    Ok(MarkupContent::Document(doc))
}

/// Parse markup into a document; the empty editor becomes an empty document.
pub fn parse_html(markup: &str) -> Result<DocumentJson, FormatError> {
    parse_markup(markup).map(MarkupContent::into_document)
}

#[derive(Default)]
struct EventWalker {
    events: Vec<Event>,
    implicit_paragraph: bool,
}

impl EventWalker {
    fn block(&mut self, node: &Handle) {
        match &node.data {
            NodeData::Text { contents } => {
                let text = collapse_whitespace(&contents.borrow());
                if text.trim().is_empty() && !self.implicit_paragraph {
                    return;
                }
                self.open_implicit();
                self.push_text(&text, false);
            }
            NodeData::Element { .. } => {
                let tag = dom::tag_name(node).unwrap_or_default();
                let id = dom::attribute(node, "data-id").map(SectionId::from);
                match tag.as_str() {
                    "p" => {
                        self.close_implicit();
                        self.events.push(Event::StartParagraph { id });
                        self.inline_children(node, false);
                        self.events.push(Event::EndParagraph);
                    }
                    "ul" | "ol" => {
                        self.close_implicit();
                        self.list(node, id);
                    }
                    _ => match heading_level(&tag) {
                        Some(level) => {
                            self.close_implicit();
                            self.events.push(Event::StartHeading { level, id });
                            self.inline_children(node, false);
                            self.events.push(Event::EndHeading);
                        }
                        None => {
                            self.open_implicit();
                            self.inline(node, false);
                        }
                    },
                }
            }
            _ => {}
        }
    }

    fn list(&mut self, node: &Handle, id: Option<SectionId>) {
        self.events.push(Event::StartList { id });
        for child in node.children.borrow().iter() {
            if dom::tag_name(child).as_deref() == Some("li") {
                self.events.push(Event::StartListItem);
                self.inline_children(child, false);
                self.events.push(Event::EndListItem);
            }
        }
        self.events.push(Event::EndList);
    }

    fn inline_children(&mut self, node: &Handle, bold: bool) {
        for child in node.children.borrow().iter() {
            self.inline(child, bold);
        }
    }

    fn inline(&mut self, node: &Handle, bold: bool) {
        match &node.data {
            NodeData::Text { contents } => {
                let text = collapse_whitespace(&contents.borrow());
                self.push_text(&text, bold);
            }
            NodeData::Element { .. } => match dom::tag_name(node).as_deref() {
                Some("br") => self.events.push(Event::LineBreak),
                Some("strong" | "b") => self.inline_children(node, true),
                // Paragraphs inside list items
                Some("p") => {
                    self.events.push(Event::LineBreak);
                    self.inline_children(node, bold);
                    self.events.push(Event::LineBreak);
                }
                _ => self.inline_children(node, bold),
            },
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str, bold: bool) {
        if !text.is_empty() {
            self.events
                .push(Event::Inline(FormattedRun::with_bold(text, bold)));
        }
    }

    fn open_implicit(&mut self) {
        if !self.implicit_paragraph {
            self.events.push(Event::StartParagraph { id: None });
            self.implicit_paragraph = true;
        }
    }

    fn close_implicit(&mut self) {
        if self.implicit_paragraph {
            self.events.push(Event::EndParagraph);
            self.implicit_paragraph = false;
        }
    }
}

fn heading_level(tag: &str) -> Option<HeadingLevel> {
    let depth = tag.strip_prefix('h')?.parse::<usize>().ok()?;
    (1..=6)
        .contains(&depth)
        .then(|| HeadingLevel::clamped(depth))
}
