//! Compatibility check against the kind of markup editing widgets produce
//! when users paste from other applications.

use docsync_core::{html_to_json, validate_markup_compatibility, FormatError, Incompatibility};

#[test]
fn test_widget_output_is_compatible() {
    let markup = concat!(
        "<h1>Jane Doe</h1>",
        "<p>Senior engineer.<br>Berlin, remote.</p>",
        "<h2>Skills</h2>",
        "<ul><li><p><strong>Rust</strong></p></li><li><p>Python</p></li></ul>",
        "<p><br></p>",
    );
    assert_eq!(validate_markup_compatibility(markup), Ok(()));
}

#[test]
fn test_full_page_wrappers_are_accepted() {
    let markup = "<!DOCTYPE html><html><head></head><body><p>Hello</p></body></html>";
    assert_eq!(validate_markup_compatibility(markup), Ok(()));
}

#[test]
fn test_pasted_spreadsheet_is_rejected() {
    let markup = r#"<p>Quarterly numbers:</p><table><tbody><tr><td>Q1</td><td>12</td></tr></tbody></table>"#;
    assert_eq!(
        validate_markup_compatibility(markup),
        Err(Incompatibility::UnsupportedElement("table".to_string()))
    );
}

#[test]
fn test_pasted_web_page_is_rejected() {
    let cases = [
        (r#"<p>Hi <a href="https://example.com">there</a></p>"#, "a"),
        (r#"<p><span style="color:red">red</span></p>"#, "span"),
        ("<p><em>styled</em></p>", "em"),
        ("<p><u>underlined</u></p>", "u"),
        ("<blockquote>quoted</blockquote>", "blockquote"),
        ("<pre>code</pre>", "pre"),
        ("<form><input></form>", "form"),
        (r#"<iframe src="x"></iframe>"#, "iframe"),
    ];
    for (markup, element) in cases {
        assert_eq!(
            validate_markup_compatibility(markup),
            Err(Incompatibility::UnsupportedElement(element.to_string())),
            "markup: {markup}"
        );
    }
}

#[test]
fn test_event_handlers_are_rejected() {
    assert_eq!(
        validate_markup_compatibility(r#"<h1 onmouseover="x()">Title</h1>"#),
        Err(Incompatibility::EventHandlerAttribute("onmouseover".to_string()))
    );
}

#[test]
fn test_nested_lists_are_rejected() {
    let markup = "<ol><li>Backend<ol><li>Rust</li></ol></li></ol>";
    assert_eq!(
        validate_markup_compatibility(markup),
        Err(Incompatibility::NestedList)
    );
}

#[test]
fn test_conversion_refuses_incompatible_markup() {
    let result = html_to_json("<p>text</p><script>alert(1)</script>");
    assert_eq!(
        result,
        Err(FormatError::IncompatibleMarkup(
            Incompatibility::UnsupportedElement("script".to_string())
        ))
    );
}
