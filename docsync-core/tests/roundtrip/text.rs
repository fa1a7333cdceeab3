//! Property tests for the plain text round trip.
//!
//! For any input `s`: `parse(serialize(parse(s)))` has the same structure as
//! `parse(s)`, and serializing is idempotent after one pass.

use docsync_core::{json_to_text, text_to_json};
use proptest::prelude::*;

fn phrase() -> impl Strategy<Value = String> {
    "[a-z]{1,6}( [a-z]{1,6}){0,3}"
}

/// Lines biased towards the prefixes the parser cares about, including the
/// near misses (`####`, `-word`, a lone `#`).
fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        (1usize..=4, phrase()).prop_map(|(n, p)| format!("{} {p}", "#".repeat(n))),
        (prop_oneof![Just('-'), Just('*'), Just('•')], phrase())
            .prop_map(|(marker, p)| format!("{marker} {p}")),
        "[ ]{0,2}[a-z#*•-]{1,4}( [a-z]{1,5}){0,2}[ ]{0,2}",
        phrase(),
    ]
}

fn document_text() -> impl Strategy<Value = String> {
    prop::collection::vec(line(), 0..12).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn text_round_trip_keeps_structure(source in document_text()) {
        let first = text_to_json(&source);
        let exported = json_to_text(&first);
        let second = text_to_json(&exported);

        prop_assert!(
            second.same_structure(&first),
            "source: {:?}\nexported: {:?}", source, exported
        );
        prop_assert_eq!(json_to_text(&second), exported);
    }

    #[test]
    fn text_parse_yields_valid_documents(source in document_text()) {
        let doc = text_to_json(&source);
        prop_assert!(doc.validate().is_ok());

        let exported = json_to_text(&doc);
        prop_assert_eq!(exported.trim(), exported.as_str());
    }
}
