//! Markup compatibility check.
//!
//! Editing widgets happily accept pasted content the model cannot represent.
//! Converting such markup would silently lose structure, so it is rejected
//! up front and the caller keeps its previous document.
//!
//! The supported vocabulary and where each element may appear:
//!
//! | Element            | Allowed parent                         |
//! |--------------------|----------------------------------------|
//! | `p`                | `body`, `li`                           |
//! | `h1`–`h6`          | `body`                                 |
//! | `ul`, `ol`         | `body` (inside `li`: nested list)      |
//! | `li`               | `ul`, `ol`                             |
//! | `strong`, `b`, `br`| `body`, `p`, `h1`–`h6`, `li`, `strong`, `b` |
//!
//! Any other element is unsupported, and so is any `on*` attribute. The
//! `html`, `head` and `body` wrappers that html5ever always synthesizes are
//! accepted; anything ending up inside `head` (`style`, `script`, `meta`, ...)
//! is unsupported by the rule above.

use super::dom;
use crate::error::Incompatibility;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const INLINE: &[&str] = &["strong", "b", "br"];

/// Reject markup that uses structure outside the supported vocabulary.
pub fn validate_markup_compatibility(markup: &str) -> Result<(), Incompatibility> {
    check_dom(&dom::parse(markup))
}

pub(crate) fn check_dom(dom: &RcDom) -> Result<(), Incompatibility> {
    check_children(&dom.document, None)
}

fn check_children(node: &Handle, parent: Option<&str>) -> Result<(), Incompatibility> {
    for child in node.children.borrow().iter() {
        if let NodeData::Element { attrs, .. } = &child.data {
            let Some(tag) = dom::tag_name(child) else {
                continue;
            };
            check_placement(&tag, parent)?;

            if let Some(handler) = attrs
                .borrow()
                .iter()
                .find(|attr| attr.name.local.to_ascii_lowercase().starts_with("on"))
            {
                return Err(Incompatibility::EventHandlerAttribute(
                    handler.name.local.to_string(),
                ));
            }

            check_children(child, Some(&tag))?;
        }
    }
    Ok(())
}

fn check_placement(tag: &str, parent: Option<&str>) -> Result<(), Incompatibility> {
    let parent_name = parent.unwrap_or("#document");
    let allowed = match tag {
        "html" => parent.is_none(),
        "head" | "body" => parent == Some("html"),
        "p" => matches!(parent, Some("body" | "li")),
        "ul" | "ol" => {
            if parent == Some("li") {
                return Err(Incompatibility::NestedList);
            }
            parent == Some("body")
        }
        "li" => matches!(parent, Some("ul" | "ol")),
        _ if HEADINGS.contains(&tag) => parent == Some("body"),
        _ if INLINE.contains(&tag) => match parent {
            Some(name) => {
                matches!(name, "body" | "p" | "li" | "strong" | "b") || HEADINGS.contains(&name)
            }
            None => false,
        },
        _ => return Err(Incompatibility::UnsupportedElement(tag.to_string())),
    };

    if allowed {
        Ok(())
    } else {
        Err(Incompatibility::MisplacedElement {
            element: tag.to_string(),
            parent: parent_name.to_string(),
        })
    }
}
