//! Converts a document model into a flat event stream.
//!
//! This mirrors `flat_to_model`: each section becomes a start event carrying
//! its id, its inline runs (with `\n` split out into `LineBreak` events) and a
//! matching end event. Feeding the result back through `events_to_document`
//! yields the same document for any model already in normal form.

use crate::model::events::Event;
use crate::model::nodes::{DocumentJson, FormattedRun, SectionKind};

/// Converts a `DocumentJson` to a flat vector of `Event`s.
pub fn document_to_events(doc: &DocumentJson) -> Vec<Event> {
    let mut events = vec![Event::StartDocument];

    for section in &doc.sections {
        let id = Some(section.id.clone());
        match &section.kind {
            SectionKind::Heading { level, content } => {
                events.push(Event::StartHeading { level: *level, id });
                emit_runs(&[FormattedRun::plain(content.as_str())], &mut events);
                events.push(Event::EndHeading);
            }
            SectionKind::Paragraph {
                content,
                formatted_content,
            } => {
                events.push(Event::StartParagraph { id });
                match formatted_content {
                    Some(runs) => emit_runs(runs, &mut events),
                    None => emit_runs(&[FormattedRun::plain(content.as_str())], &mut events),
                }
                events.push(Event::EndParagraph);
            }
            SectionKind::List {
                items,
                formatted_items,
            } => {
                events.push(Event::StartList { id });
                for (index, item) in items.iter().enumerate() {
                    events.push(Event::StartListItem);
                    match formatted_items.as_ref().and_then(|all| all.get(index)) {
                        Some(runs) => emit_runs(runs, &mut events),
                        None => emit_runs(&[FormattedRun::plain(item.as_str())], &mut events),
                    }
                    events.push(Event::EndListItem);
                }
                events.push(Event::EndList);
            }
        }
    }

    events.push(Event::EndDocument);
    events
}

fn emit_runs(runs: &[FormattedRun], events: &mut Vec<Event>) {
    for run in runs {
        let mut lines = run.text.split('\n');
        if let Some(first) = lines.next() {
            emit_text(first, run.is_bold(), events);
        }
        for line in lines {
            events.push(Event::LineBreak);
            emit_text(line, run.is_bold(), events);
        }
    }
}

fn emit_text(text: &str, bold: bool, events: &mut Vec<Event>) {
    if !text.is_empty() {
        events.push(Event::Inline(FormattedRun::with_bold(text, bold)));
    }
}
