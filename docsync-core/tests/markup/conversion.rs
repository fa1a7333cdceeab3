//! Markup ⇄ model conversion through the public API.

use docsync_core::{html_to_json, json_to_html, json_to_text, text_to_json, SectionKind};
use insta::assert_snapshot;

#[test]
fn test_text_to_markup_to_text() {
    let text = "# Summary\n\nExperienced engineer.\nBased in Berlin.\n\n## Skills\n\n- Python\n- Rust";
    let doc = text_to_json(text);
    let markup = json_to_html(&doc).unwrap();

    assert!(markup.contains("Experienced engineer.<br>Based in Berlin."));
    let back = html_to_json(&markup).unwrap();
    assert_eq!(back, doc);
    assert_eq!(json_to_text(&back), text);
}

#[test]
fn test_typed_whitespace_reads_back_from_markup() {
    let doc = text_to_json("Led  a\tteam\u{a0}of five\n\n-  Rust,   Go");
    let markup = json_to_html(&doc).unwrap();

    assert_eq!(html_to_json(&markup).unwrap(), doc);
    assert_eq!(json_to_text(&doc), "Led a team of five\n\n- Rust, Go");
}

#[test]
fn test_widget_edit_to_text() {
    let markup = concat!(
        "<h1>Summary</h1>",
        "<p>Experienced <b>backend</b> engineer.</p>",
        "<h5>Details</h5>",
        "<ol><li>Python</li><li><p>Rust</p></li></ol>",
        "<p><br></p>",
    );
    let doc = html_to_json(markup).unwrap();

    assert_snapshot!(json_to_text(&doc), @r"
    # Summary

    Experienced backend engineer.

    ### Details

    - Python
    - Rust
    ");
}

#[test]
fn test_bold_survives_markup_round_trip() {
    let doc = html_to_json("<p><strong>Led</strong> a team of five</p>").unwrap();
    let markup = json_to_html(&doc).unwrap();

    assert!(markup.contains("<strong>Led</strong> a team of five</p>"));
    match &html_to_json(&markup).unwrap().sections[0].kind {
        SectionKind::Paragraph {
            formatted_content: Some(runs),
            ..
        } => {
            assert!(runs[0].is_bold());
            assert_eq!(runs[1].text, " a team of five");
        }
        other => panic!("Expected formatted paragraph, got {other:?}"),
    }
}
