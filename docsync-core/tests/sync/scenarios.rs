//! End-to-end editing sessions against the sync engine, persisting through a
//! channel the way a host hands snapshots to its writer task.

use docsync_core::sync::{
    ChannelSink, ManualClock, PersistError, Snapshot, SyncEngine, SyncOptions, SyncState,
    UpdateOutcome,
};
use docsync_core::{Incompatibility, SectionKind};
use std::sync::mpsc::Receiver;
use std::time::Duration;

const RESUME: &str = "# Summary\n\nExperienced engineer.\n\n- Python\n- Rust";

fn session(text: &str) -> (SyncEngine<ChannelSink, ManualClock>, ManualClock, Receiver<Snapshot>) {
    let (sink, receiver) = ChannelSink::channel();
    let clock = ManualClock::new();
    let engine = SyncEngine::with_clock(text, SyncOptions::default(), sink, clock.clone())
        .expect("initial text to render");
    (engine, clock, receiver)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_resume_session() {
    let (mut engine, clock, saved) = session(RESUME);

    let kinds: Vec<&str> = engine
        .model()
        .sections
        .iter()
        .map(|section| section.kind.type_name())
        .collect();
    assert_eq!(kinds, vec!["heading", "paragraph", "list"]);
    assert_eq!(engine.get_plain_text(), RESUME);

    // The widget loads the markup and the user adds a skill.
    let edited = engine
        .markup()
        .replace("<li>Rust</li>", "<li>Rust</li><li>Go</li>");
    assert!(matches!(
        engine.update_from_html(&edited),
        UpdateOutcome::Accepted { .. }
    ));

    // Ids survive the widget round trip.
    assert_eq!(
        engine.model().sections[2].id,
        engine.original().sections[2].id
    );

    clock.advance(ms(300));
    assert_eq!(engine.tick(), Ok(true));

    let snapshot = saved.try_recv().expect("one snapshot");
    assert_eq!(
        snapshot.plain_text,
        "# Summary\n\nExperienced engineer.\n\n- Python\n- Rust\n- Go"
    );
    match &snapshot.document.sections[2].kind {
        SectionKind::List { items, .. } => assert_eq!(items.len(), 3),
        other => panic!("Expected list, got {other:?}"),
    }
    assert!(saved.try_recv().is_err());
}

#[test]
fn test_edit_leaves_other_sections_untouched() {
    let (mut engine, clock, saved) = session("Skills:\tRust,  Go\n\n- Python");
    let skills = engine.model().sections[0].clone();
    let list = engine.model().sections[1].clone();

    let edited = engine
        .markup()
        .replace("<li>Python</li>", "<li>Python</li><li>Go</li>");
    assert!(matches!(
        engine.update_from_html(&edited),
        UpdateOutcome::Accepted { .. }
    ));

    assert_eq!(engine.model().section(&skills.id), Some(&skills));
    assert_ne!(engine.model().section(&list.id), Some(&list));

    clock.advance(ms(300));
    assert_eq!(engine.tick(), Ok(true));
    let snapshot = saved.try_recv().expect("one snapshot");
    assert_eq!(snapshot.document.sections[0], skills);
    assert_eq!(snapshot.plain_text, "Skills: Rust, Go\n\n- Python\n- Go");
}

#[test]
fn test_pasted_table_keeps_previous_state() {
    let (mut engine, clock, saved) = session(RESUME);
    let markup_before = engine.markup().to_string();
    let model_before = engine.model().clone();

    let pasted = format!(
        "{markup_before}<table><tr><td>Q1</td><td>12</td></tr></table>"
    );
    match engine.update_from_html(&pasted) {
        UpdateOutcome::Rejected { reason, markup } => {
            assert_eq!(reason, Incompatibility::UnsupportedElement("table".to_string()));
            assert_eq!(markup, markup_before);
        }
        other => panic!("Expected rejection, got {other:?}"),
    }

    assert_eq!(engine.model(), &model_before);
    assert!(!engine.has_unsaved_changes());
    assert_eq!(engine.state(), SyncState::Idle);

    clock.advance(ms(1000));
    assert_eq!(engine.tick(), Ok(false));
    assert!(saved.try_recv().is_err());
}

#[test]
fn test_typing_burst_saves_last_state_once() {
    let (mut engine, clock, saved) = session("");

    let mut typed = String::new();
    for word in ["Led", "a", "team", "of", "five"] {
        if !typed.is_empty() {
            typed.push(' ');
        }
        typed.push_str(word);
        engine.update_from_html(&format!("<p>{typed}</p>"));
        clock.advance(ms(120));
        engine.tick().unwrap();
    }

    assert!(saved.try_recv().is_err());
    clock.advance(ms(300));
    assert_eq!(engine.tick(), Ok(true));

    let snapshot = saved.try_recv().expect("one snapshot");
    assert_eq!(snapshot.plain_text, "Led a team of five");
    assert!(saved.try_recv().is_err());
}

#[test]
fn test_reset_after_edits() {
    let (mut engine, clock, saved) = session(RESUME);
    let original_markup = engine.markup().to_string();

    engine.update_from_html("<h1>Something else</h1>");
    engine.reset_to_original();

    assert_eq!(engine.markup(), original_markup);
    assert_eq!(engine.get_plain_text(), RESUME);
    assert!(!engine.has_unsaved_changes());

    clock.advance(ms(1000));
    assert_eq!(engine.tick(), Ok(false));
    assert!(saved.try_recv().is_err());
}

#[test]
fn test_disconnected_writer_surfaces_error() {
    let (mut engine, _, saved) = session(RESUME);
    drop(saved);

    engine.update_from_html("<p>edit</p>");
    assert_eq!(engine.save_changes(), Err(PersistError::Disconnected));
    assert!(engine.has_unsaved_changes());
}
