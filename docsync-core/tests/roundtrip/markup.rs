//! Property tests for the markup round trip.
//!
//! Documents are generated as event streams and normalized by the shared
//! builder, so every generated model is in normal form. Rendering such a
//! model and parsing it back must give the identical model, ids included.
//! Models built from typed text with arbitrary whitespace must read back the
//! same way.

use docsync_core::common::flat_to_model::events_to_document;
use docsync_core::model::events::Event;
use docsync_core::{html_to_json, json_to_html, text_to_json, validate_markup_compatibility};
use docsync_core::{FormattedRun, HeadingLevel};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Block {
    Heading(u8, Vec<(String, bool)>),
    /// Runs with a bold flag and a trailing line break flag.
    Paragraph(Vec<(String, bool, bool)>),
    List(Vec<Vec<(String, bool)>>),
}

fn phrase() -> impl Strategy<Value = String> {
    "[a-z]{1,6}( [a-z]{1,6}){0,3} ?"
}

fn run() -> impl Strategy<Value = (String, bool)> {
    (phrase(), any::<bool>())
}

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        (1u8..=3, prop::collection::vec(run(), 1..3))
            .prop_map(|(level, runs)| Block::Heading(level, runs)),
        prop::collection::vec((phrase(), any::<bool>(), any::<bool>()), 1..5)
            .prop_map(Block::Paragraph),
        prop::collection::vec(prop::collection::vec(run(), 1..3), 1..4).prop_map(Block::List),
    ]
}

/// A typed line: an optional heading or bullet prefix, then words separated by
/// runs of spaces, tabs and non-breaking spaces.
fn typed_line() -> impl Strategy<Value = String> {
    (
        "(#{1,3}|[-*•])?",
        prop::collection::vec(("[a-z,:]{1,6}", "[ \t\u{a0}]{1,3}"), 1..5),
    )
        .prop_map(|(prefix, words)| {
            let mut line = prefix;
            for (word, gap) in words {
                line.push_str(&gap);
                line.push_str(&word);
            }
            line
        })
}

fn inline(text: &str, bold: bool) -> Event {
    Event::Inline(FormattedRun::with_bold(text, bold))
}

fn to_events(blocks: &[Block]) -> Vec<Event> {
    let mut events = vec![Event::StartDocument];
    for block in blocks {
        match block {
            Block::Heading(level, runs) => {
                events.push(Event::StartHeading {
                    level: HeadingLevel::new(*level).unwrap(),
                    id: None,
                });
                events.extend(runs.iter().map(|(text, bold)| inline(text, *bold)));
                events.push(Event::EndHeading);
            }
            Block::Paragraph(runs) => {
                events.push(Event::StartParagraph { id: None });
                for (text, bold, line_break) in runs {
                    events.push(inline(text, *bold));
                    if *line_break {
                        events.push(Event::LineBreak);
                    }
                }
                events.push(Event::EndParagraph);
            }
            Block::List(items) => {
                events.push(Event::StartList { id: None });
                for runs in items {
                    events.push(Event::StartListItem);
                    events.extend(runs.iter().map(|(text, bold)| inline(text, *bold)));
                    events.push(Event::EndListItem);
                }
                events.push(Event::EndList);
            }
        }
    }
    events.push(Event::EndDocument);
    events
}

proptest! {
    #[test]
    fn markup_round_trip_is_exact(blocks in prop::collection::vec(block(), 0..6)) {
        let doc = events_to_document(&to_events(&blocks)).unwrap();
        let markup = json_to_html(&doc).unwrap();

        prop_assert_eq!(validate_markup_compatibility(&markup), Ok(()));
        prop_assert_eq!(html_to_json(&markup).unwrap(), doc, "markup: {}", markup);
    }

    #[test]
    fn typed_text_reads_back_from_markup(
        lines in prop::collection::vec(prop_oneof![typed_line(), Just(String::new())], 0..8)
    ) {
        let doc = text_to_json(&lines.join("\n"));
        let markup = json_to_html(&doc).unwrap();

        prop_assert!(doc.validate().is_ok());
        prop_assert_eq!(html_to_json(&markup).unwrap(), doc, "markup: {}", markup);
    }

    #[test]
    fn markup_rendering_is_stable(blocks in prop::collection::vec(block(), 0..6)) {
        let doc = events_to_document(&to_events(&blocks)).unwrap();
        let markup = json_to_html(&doc).unwrap();
        let again = json_to_html(&html_to_json(&markup).unwrap()).unwrap();
        prop_assert_eq!(again, markup);
    }
}
