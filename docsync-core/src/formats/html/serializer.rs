//! HTML serialization (model → markup)
//!
//! Pipeline: DocumentJson → Events → RcDom → HTML string
//!
//! The output is a body fragment meant to be loaded into an editing widget,
//! not a standalone page: no `<html>` wrapper, no styles. Every block
//! carries its section id in `data-id` so ids survive an edit round trip.

use crate::common::model_to_flat::document_to_events;
use crate::error::FormatError;
use crate::model::events::Event;
use crate::model::nodes::DocumentJson;
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Serialize a document to an HTML fragment.
pub fn serialize_html(doc: &DocumentJson) -> Result<String, FormatError> {
    let events = document_to_events(doc);
    let container = build_fragment(&events)?;
    serialize_children(&container)
}

/// Build the fragment under a detached container element.
fn build_fragment(events: &[Event]) -> Result<Handle, FormatError> {
    let container = create_element("div", vec![]);
    let mut current_parent: Handle = container.clone();
    let mut parent_stack: Vec<Handle> = vec![];

    for event in events {
        match event {
            Event::StartDocument | Event::EndDocument => {}

            Event::StartHeading { level, id } => {
                let tag = format!("h{}", level.get());
                let heading = create_block(&tag, id.as_ref().map(|id| id.as_str()));
                open(&mut current_parent, &mut parent_stack, heading);
            }

            Event::StartParagraph { id } => {
                let para = create_block("p", id.as_ref().map(|id| id.as_str()));
                open(&mut current_parent, &mut parent_stack, para);
            }

            Event::StartList { id } => {
                let list = create_block("ul", id.as_ref().map(|id| id.as_str()));
                open(&mut current_parent, &mut parent_stack, list);
            }

            Event::StartListItem => {
                let item = create_element("li", vec![]);
                open(&mut current_parent, &mut parent_stack, item);
            }

            Event::EndHeading | Event::EndParagraph | Event::EndList | Event::EndListItem => {
                current_parent = parent_stack.pop().ok_or_else(|| {
                    FormatError::SerializationError(format!("Unbalanced end event: {event:?}"))
                })?;
            }

            Event::Inline(run) => {
                let text = create_text(&run.text);
                if run.is_bold() {
                    let strong = create_element("strong", vec![]);
                    strong.children.borrow_mut().push(text);
                    current_parent.children.borrow_mut().push(strong);
                } else {
                    current_parent.children.borrow_mut().push(text);
                }
            }

            Event::LineBreak => {
                current_parent
                    .children
                    .borrow_mut()
                    .push(create_element("br", vec![]));
            }
        }
    }

    if !parent_stack.is_empty() {
        return Err(FormatError::SerializationError(
            "Unclosed block at end of document".to_string(),
        ));
    }

    Ok(container)
}

fn open(current_parent: &mut Handle, parent_stack: &mut Vec<Handle>, node: Handle) {
    current_parent.children.borrow_mut().push(node.clone());
    parent_stack.push(current_parent.clone());
    *current_parent = node;
}

fn create_block(tag: &str, id: Option<&str>) -> Handle {
    match id {
        Some(id) => create_element(tag, vec![("data-id", id)]),
        None => create_element(tag, vec![]),
    }
}

/// Create an HTML element with the given attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize the children of the container, each including its own tag.
fn serialize_children(container: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in container.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {e}"))
        })?;
    }

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}
