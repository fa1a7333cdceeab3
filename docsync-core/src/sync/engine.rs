//! The synchronization engine.
//!
//! Owns the canonical document and keeps the editor markup derived from it.
//! Edits arrive as markup (from the widget) or as a whole document; accepted
//! edits schedule a debounced save, invalid ones leave every piece of state
//! untouched and hand back the last valid markup to republish.
//!
//! The engine is sans-IO. It never sleeps or spawns timers: the host calls
//! [`SyncEngine::tick`] at or after [`SyncEngine::next_deadline`].

use super::clock::{Clock, SystemClock};
use super::debounce::{Debouncer, DEFAULT_DEBOUNCE_MS};
use super::persistence::{PersistError, PersistenceSink, Snapshot};
use crate::error::{FormatError, Incompatibility};
use crate::formats::html::{parse_markup, serialize_html};
use crate::formats::text::{parse_text, serialize_text, TextOptions};
use crate::model::DocumentJson;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Quiet period after the last accepted edit before the save fires.
    pub debounce: Duration,
    /// Schedule saves automatically after accepted edits.
    pub auto_save: bool,
    /// Options for the plain-text export carried in every snapshot.
    pub text: TextOptions,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            auto_save: true,
            text: TextOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    /// A debounced save is scheduled.
    PendingSave,
}

/// Result of feeding widget markup to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The markup matches the current document; nothing happened.
    Unchanged,
    /// The markup uses unsupported structure. `markup` is the last valid
    /// markup, to be put back into the widget.
    Rejected {
        reason: Incompatibility,
        markup: String,
    },
    /// The markup could not be converted. `markup` is the last valid markup.
    RolledBack { reason: FormatError, markup: String },
    /// The edit replaced the document. `markup` is the normalized markup.
    Accepted { markup: String },
}

/// Why the most recent edit was not applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncFailure {
    Rejected(Incompatibility),
    RolledBack(FormatError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub struct SyncEngine<S: PersistenceSink, C: Clock = SystemClock> {
    model: DocumentJson,
    markup: String,
    original: DocumentJson,
    original_markup: String,
    has_unsaved_changes: bool,
    debouncer: Debouncer,
    options: SyncOptions,
    sink: S,
    clock: C,
    last_failure: Option<SyncFailure>,
}

impl<S: PersistenceSink> SyncEngine<S> {
    pub fn new(initial_text: &str, options: SyncOptions, sink: S) -> Result<Self, FormatError> {
        Self::with_clock(initial_text, options, sink, SystemClock)
    }
}

impl<S: PersistenceSink, C: Clock> SyncEngine<S, C> {
    /// Build an engine from plain text (possibly empty) with an explicit clock.
    pub fn with_clock(
        initial_text: &str,
        options: SyncOptions,
        sink: S,
        clock: C,
    ) -> Result<Self, FormatError> {
        let original = parse_text(initial_text);
        let original_markup = serialize_html(&original)?;
        debug!(
            sections = original.sections.len(),
            "sync engine initialized"
        );

        Ok(Self {
            model: original.clone(),
            markup: original_markup.clone(),
            original,
            original_markup,
            has_unsaved_changes: false,
            debouncer: Debouncer::new(options.debounce),
            options,
            sink,
            clock,
            last_failure: None,
        })
    }

    /// Apply an edit coming from the widget.
    pub fn update_from_html(&mut self, markup: &str) -> UpdateOutcome {
        if markup == self.markup {
            return self.unchanged();
        }

        let document = match parse_markup(markup) {
            Ok(content) => content.into_document(),
            Err(FormatError::IncompatibleMarkup(reason)) => {
                warn!(%reason, "rejected incompatible markup");
                self.last_failure = Some(SyncFailure::Rejected(reason.clone()));
                return UpdateOutcome::Rejected {
                    reason,
                    markup: self.markup.clone(),
                };
            }
            Err(err) => return self.roll_back(err),
        };

        if document.same_structure(&self.model) {
            return self.unchanged();
        }

        let normalized = match serialize_html(&document) {
            Ok(normalized) => normalized,
            Err(err) => return self.roll_back(err),
        };

        self.model = document;
        self.markup = normalized;
        self.has_unsaved_changes = true;
        self.last_failure = None;
        debug!(sections = self.model.sections.len(), "accepted markup edit");

        if self.options.auto_save {
            self.debouncer.arm(self.clock.now());
            debug!(debounce_ms = self.options.debounce.as_millis() as u64, "save scheduled");
        }

        UpdateOutcome::Accepted {
            markup: self.markup.clone(),
        }
    }

    /// Replace the whole document and persist it right away.
    pub fn update_from_json(&mut self, document: DocumentJson) -> Result<(), SyncError> {
        document.validate()?;
        let markup = serialize_html(&document)?;

        self.model = document;
        self.markup = markup;
        self.has_unsaved_changes = true;
        self.last_failure = None;
        self.debouncer.cancel();
        debug!(sections = self.model.sections.len(), "replaced document");

        self.persist()?;
        Ok(())
    }

    /// Go back to the document the engine was created with. Never persists.
    pub fn reset_to_original(&mut self) {
        self.model = self.original.clone();
        self.markup = self.original_markup.clone();
        self.has_unsaved_changes = false;
        self.last_failure = None;
        self.debouncer.cancel();
        debug!("reset to original document");
    }

    /// Persist now if there is anything unsaved. Returns whether a save happened.
    pub fn save_changes(&mut self) -> Result<bool, PersistError> {
        if !self.has_unsaved_changes {
            return Ok(false);
        }
        self.debouncer.cancel();
        self.persist()?;
        Ok(true)
    }

    /// Fire the debounced save if its deadline has passed. Returns whether a
    /// save happened.
    pub fn tick(&mut self) -> Result<bool, PersistError> {
        if !self.debouncer.fire_if_due(self.clock.now()) || !self.has_unsaved_changes {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// When the host should call [`tick`](Self::tick) next, if a save is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn get_plain_text(&self) -> String {
        serialize_text(&self.model, &self.options.text)
    }

    /// Shut the engine down. A pending debounced save is discarded.
    pub fn close(mut self) {
        if self.debouncer.is_armed() {
            debug!("discarding pending save on close");
        }
        self.debouncer.cancel();
    }

    pub fn model(&self) -> &DocumentJson {
        &self.model
    }

    pub fn original(&self) -> &DocumentJson {
        &self.original
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn state(&self) -> SyncState {
        if self.debouncer.is_armed() {
            SyncState::PendingSave
        } else {
            SyncState::Idle
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn last_failure(&self) -> Option<&SyncFailure> {
        self.last_failure.as_ref()
    }

    /// The widget is back in agreement with the model.
    fn unchanged(&mut self) -> UpdateOutcome {
        self.last_failure = None;
        UpdateOutcome::Unchanged
    }

    fn roll_back(&mut self, reason: FormatError) -> UpdateOutcome {
        warn!(%reason, "rolled back markup edit");
        self.last_failure = Some(SyncFailure::RolledBack(reason.clone()));
        UpdateOutcome::RolledBack {
            reason,
            markup: self.markup.clone(),
        }
    }

    fn persist(&mut self) -> Result<(), PersistError> {
        let snapshot = Snapshot {
            document: self.model.clone(),
            plain_text: self.get_plain_text(),
        };
        match self.sink.persist(snapshot) {
            Ok(()) => {
                self.has_unsaved_changes = false;
                debug!("document saved");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentSection, SectionKind};
    use crate::sync::clock::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    const RESUME: &str = "# Summary\n\nExperienced engineer.\n\n- Python\n- Rust";

    type Saved = Rc<RefCell<Vec<Snapshot>>>;

    fn recording() -> (impl FnMut(Snapshot) -> Result<(), PersistError>, Saved) {
        let saved: Saved = Rc::default();
        let handle = saved.clone();
        let sink = move |snapshot: Snapshot| -> Result<(), PersistError> {
            handle.borrow_mut().push(snapshot);
            Ok(())
        };
        (sink, saved)
    }

    fn engine(
        text: &str,
    ) -> (
        SyncEngine<impl FnMut(Snapshot) -> Result<(), PersistError>, ManualClock>,
        ManualClock,
        Saved,
    ) {
        let (sink, saved) = recording();
        let clock = ManualClock::new();
        let engine =
            SyncEngine::with_clock(text, SyncOptions::default(), sink, clock.clone()).unwrap();
        (engine, clock, saved)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn accepted(outcome: UpdateOutcome) -> String {
        match outcome {
            UpdateOutcome::Accepted { markup } => markup,
            other => panic!("Expected accepted edit, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_state() {
        let (engine, _, saved) = engine(RESUME);

        assert_eq!(engine.model().sections.len(), 3);
        assert_eq!(engine.model(), engine.original());
        assert!(engine.markup().starts_with("<h1 data-id="));
        assert!(!engine.has_unsaved_changes());
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(engine.get_plain_text(), RESUME);
        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn test_empty_initial_text() {
        let (engine, _, _) = engine("");
        assert!(engine.model().is_empty());
        assert_eq!(engine.markup(), "");
        assert_eq!(engine.get_plain_text(), "");
    }

    #[test]
    fn test_accepted_edit_saves_after_window() {
        let (mut engine, clock, saved) = engine(RESUME);

        let markup = accepted(engine.update_from_html(
            "<h1>Summary</h1><p>Experienced <strong>engineer</strong>.</p>",
        ));
        assert!(markup.contains("<strong>engineer</strong>"));
        assert!(engine.has_unsaved_changes());
        assert_eq!(engine.state(), SyncState::PendingSave);
        assert_eq!(engine.next_deadline(), Some(clock.now() + ms(300)));

        clock.advance(ms(299));
        assert_eq!(engine.tick(), Ok(false));
        assert!(saved.borrow().is_empty());

        clock.advance(ms(1));
        assert_eq!(engine.tick(), Ok(true));
        assert!(!engine.has_unsaved_changes());
        assert_eq!(engine.state(), SyncState::Idle);

        let saved = saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].plain_text, "# Summary\n\nExperienced engineer.");
        assert_eq!(&saved[0].document, engine.model());
    }

    #[test]
    fn test_rapid_edits_save_once_with_last_state() {
        let (mut engine, clock, saved) = engine(RESUME);

        for n in 1..=5 {
            accepted(engine.update_from_html(&format!("<p>draft {n}</p>")));
            clock.advance(ms(50));
            assert_eq!(engine.tick(), Ok(false));
        }

        clock.advance(ms(250));
        assert_eq!(engine.tick(), Ok(true));
        clock.advance(ms(1000));
        assert_eq!(engine.tick(), Ok(false));

        let saved = saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].plain_text, "draft 5");
    }

    #[test]
    fn test_incompatible_markup_is_rejected() {
        let (mut engine, clock, saved) = engine(RESUME);
        let before_model = engine.model().clone();
        let before_markup = engine.markup().to_string();

        let outcome =
            engine.update_from_html("<p>Experienced engineer.</p><table><tr><td>x</td></tr></table>");

        assert_eq!(
            outcome,
            UpdateOutcome::Rejected {
                reason: Incompatibility::UnsupportedElement("table".to_string()),
                markup: before_markup.clone(),
            }
        );
        assert_eq!(engine.model(), &before_model);
        assert_eq!(engine.markup(), before_markup);
        assert!(!engine.has_unsaved_changes());
        assert!(matches!(
            engine.last_failure(),
            Some(SyncFailure::Rejected(_))
        ));

        clock.advance(ms(1000));
        assert_eq!(engine.tick(), Ok(false));
        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn test_degenerate_markup_rolls_back() {
        let (mut engine, _, _) = engine(RESUME);
        let before_markup = engine.markup().to_string();

        let outcome = engine.update_from_html("<ul>stray</ul>");

        assert_eq!(
            outcome,
            UpdateOutcome::RolledBack {
                reason: FormatError::DegenerateMarkup,
                markup: before_markup,
            }
        );
        assert_eq!(engine.model().sections.len(), 3);
        assert_eq!(engine.state(), SyncState::Idle);
    }

    #[test]
    fn test_failure_cleared_by_next_accepted_edit() {
        let (mut engine, _, _) = engine(RESUME);
        engine.update_from_html("<div>x</div>");
        assert!(engine.last_failure().is_some());

        accepted(engine.update_from_html("<p>fixed</p>"));
        assert!(engine.last_failure().is_none());
    }

    #[test]
    fn test_failure_cleared_when_widget_returns_to_published_markup() {
        let (mut engine, _, _) = engine(RESUME);
        let current = engine.markup().to_string();
        engine.update_from_html("<div>x</div>");
        assert!(engine.last_failure().is_some());

        assert_eq!(engine.update_from_html(&current), UpdateOutcome::Unchanged);
        assert!(engine.last_failure().is_none());

        engine.update_from_html("<ul>stray</ul>");
        assert!(engine.last_failure().is_some());
        assert_eq!(
            engine.update_from_html(
                "<h1>Summary</h1><p>Experienced engineer.</p><ul><li>Python</li><li>Rust</li></ul>"
            ),
            UpdateOutcome::Unchanged
        );
        assert!(engine.last_failure().is_none());
    }

    #[test]
    fn test_echo_is_unchanged() {
        let (mut engine, _, _) = engine(RESUME);
        let current = engine.markup().to_string();

        assert_eq!(engine.update_from_html(&current), UpdateOutcome::Unchanged);
        assert_eq!(
            engine.update_from_html(
                "<h1>Summary</h1><p>Experienced engineer.</p><ul><li>Python</li><li>Rust</li></ul>"
            ),
            UpdateOutcome::Unchanged
        );
        assert!(!engine.has_unsaved_changes());
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_empty_editor_clears_document() {
        let (mut engine, _, _) = engine(RESUME);

        let markup = accepted(engine.update_from_html("<p><br></p>"));

        assert_eq!(markup, "");
        assert!(engine.model().is_empty());
        assert_eq!(engine.get_plain_text(), "");
    }

    #[test]
    fn test_reset_to_original() {
        let (mut engine, clock, saved) = engine(RESUME);
        let original_markup = engine.markup().to_string();

        accepted(engine.update_from_html("<p>rewritten</p>"));
        engine.reset_to_original();

        assert_eq!(engine.model(), engine.original());
        assert_eq!(engine.markup(), original_markup);
        assert!(!engine.has_unsaved_changes());
        assert_eq!(engine.state(), SyncState::Idle);

        clock.advance(ms(1000));
        assert_eq!(engine.tick(), Ok(false));
        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn test_save_changes() {
        let (mut engine, clock, saved) = engine(RESUME);
        assert_eq!(engine.save_changes(), Ok(false));

        accepted(engine.update_from_html("<p>now</p>"));
        assert_eq!(engine.save_changes(), Ok(true));
        assert_eq!(engine.state(), SyncState::Idle);

        clock.advance(ms(1000));
        assert_eq!(engine.tick(), Ok(false));
        assert_eq!(saved.borrow().len(), 1);
    }

    #[test]
    fn test_failed_save_keeps_changes_unsaved() {
        let clock = ManualClock::new();
        let attempts = Rc::new(RefCell::new(0));
        let counter = attempts.clone();
        let sink = move |_: Snapshot| -> Result<(), PersistError> {
            *counter.borrow_mut() += 1;
            Err(PersistError::Backend("offline".to_string()))
        };
        let mut engine =
            SyncEngine::with_clock(RESUME, SyncOptions::default(), sink, clock.clone()).unwrap();

        accepted(engine.update_from_html("<p>edit</p>"));
        clock.advance(ms(300));
        assert_eq!(
            engine.tick(),
            Err(PersistError::Backend("offline".to_string()))
        );
        assert!(engine.has_unsaved_changes());

        clock.advance(ms(1000));
        assert_eq!(engine.tick(), Ok(false));
        assert_eq!(*attempts.borrow(), 1);

        assert!(engine.save_changes().is_err());
        assert!(engine.has_unsaved_changes());
        assert_eq!(*attempts.borrow(), 2);
    }

    #[test]
    fn test_update_from_json_persists_immediately() {
        let (mut engine, clock, saved) = engine(RESUME);
        accepted(engine.update_from_html("<p>pending</p>"));

        let doc = DocumentJson::new(vec![DocumentSection::paragraph("from json")]);
        engine.update_from_json(doc.clone()).unwrap();

        assert_eq!(engine.model(), &doc);
        assert!(engine.markup().contains("from json"));
        assert!(!engine.has_unsaved_changes());
        assert_eq!(engine.state(), SyncState::Idle);

        clock.advance(ms(1000));
        assert_eq!(engine.tick(), Ok(false));
        let saved = saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].document, doc);
    }

    #[test]
    fn test_update_from_json_rejects_invalid_document() {
        let (mut engine, _, saved) = engine(RESUME);
        let paragraph = |content: &str| SectionKind::Paragraph {
            content: content.to_string(),
            formatted_content: None,
        };
        let doc = DocumentJson::new(vec![
            DocumentSection::with_id("dup", paragraph("a")),
            DocumentSection::with_id("dup", paragraph("b")),
        ]);

        assert!(matches!(
            engine.update_from_json(doc),
            Err(SyncError::Format(FormatError::InvalidDocument(_)))
        ));
        assert_eq!(engine.model(), engine.original());
        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn test_update_from_json_rejects_unrenderable_sections() {
        let (mut engine, _, saved) = engine(RESUME);
        let doc = DocumentJson::new(vec![
            DocumentSection::with_id(
                "a",
                SectionKind::Paragraph {
                    content: String::new(),
                    formatted_content: None,
                },
            ),
            DocumentSection::with_id(
                "b",
                SectionKind::Paragraph {
                    content: "x".to_string(),
                    formatted_content: None,
                },
            ),
        ]);

        assert!(matches!(
            engine.update_from_json(doc),
            Err(SyncError::Format(FormatError::InvalidDocument(_)))
        ));
        assert_eq!(engine.model(), engine.original());
        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn test_manual_save_mode() {
        let (sink, saved) = recording();
        let clock = ManualClock::new();
        let options = SyncOptions {
            auto_save: false,
            ..SyncOptions::default()
        };
        let mut engine = SyncEngine::with_clock(RESUME, options, sink, clock.clone()).unwrap();

        accepted(engine.update_from_html("<p>draft</p>"));
        assert_eq!(engine.next_deadline(), None);
        clock.advance(ms(1000));
        assert_eq!(engine.tick(), Ok(false));
        assert!(engine.has_unsaved_changes());

        assert_eq!(engine.save_changes(), Ok(true));
        assert_eq!(saved.borrow().len(), 1);
    }

    #[test]
    fn test_close_discards_pending_save() {
        let (mut engine, clock, saved) = engine(RESUME);
        accepted(engine.update_from_html("<p>draft</p>"));

        engine.close();
        clock.advance(ms(1000));

        assert!(saved.borrow().is_empty());
    }
}
