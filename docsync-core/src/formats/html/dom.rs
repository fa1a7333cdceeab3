//! Small helpers over the html5ever `RcDom` shared by the parser and the
//! compatibility check.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse a markup fragment. html5ever never fails: malformed input is repaired
/// the way a browser would, and the `html`/`head`/`body` wrappers are always
/// synthesized.
pub(crate) fn parse(markup: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(markup)
}

/// Lowercase local name of an element node.
pub(crate) fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

pub(crate) fn attribute(node: &Handle, attr: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|candidate| &*candidate.name.local == attr)
            .map(|found| found.value.to_string()),
        _ => None,
    }
}

pub(crate) fn body(dom: &RcDom) -> Option<Handle> {
    find_element(&dom.document, "body")
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if tag_name(node).as_deref() == Some(tag) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// Whether any text below `node` contains a non-whitespace character.
/// `&nbsp;` counts as whitespace.
pub(crate) fn has_text(node: &Handle) -> bool {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().chars().any(|c| !c.is_whitespace()),
        _ => node.children.borrow().iter().any(has_text),
    }
}
