//! Scripted editing sessions.
//!
//! A replay script is a JSON array of steps fed to a `SyncEngine` running on
//! a manual clock, so debounce behavior is reproducible:
//!
//! ```json
//! [
//!   {"html": "<h1>Summary</h1><p>Edited.</p>"},
//!   {"wait_ms": 300},
//!   {"json": {"version": "1.0", "sections": []}},
//!   {"save": true},
//!   {"reset": true}
//! ]
//! ```
//!
//! Every snapshot handed to the persistence sink is written to the output as
//! one JSON line, in the order the engine persisted them.

use docsync_core::error::FormatError;
use docsync_core::formats::json::parse_value;
use docsync_core::sync::{
    ChannelSink, ManualClock, PersistError, Snapshot, SyncEngine, SyncError, SyncOptions,
    UpdateOutcome,
};
use serde::Deserialize;
use std::io::{self, Write};
use std::sync::mpsc::Receiver;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Markup coming from the editing widget.
    Html(String),
    /// A whole document replacing the current one.
    Json(serde_json::Value),
    /// Advance the clock and fire a due save.
    WaitMs(u64),
    Save(bool),
    Reset(bool),
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid replay script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("failed to write snapshot: {0}")]
    Io(#[from] io::Error),
}

pub fn parse_script(source: &str) -> Result<Vec<Step>, ReplayError> {
    Ok(serde_json::from_str(source)?)
}

/// Drive an engine through `steps`, writing persisted snapshots to `out`.
pub fn run(
    initial_text: &str,
    steps: &[Step],
    options: SyncOptions,
    out: &mut impl Write,
) -> Result<(), ReplayError> {
    let (sink, snapshots) = ChannelSink::channel();
    let clock = ManualClock::new();
    let mut engine = SyncEngine::with_clock(initial_text, options, sink, clock.clone())?;

    for (index, step) in steps.iter().enumerate() {
        match step {
            Step::Html(markup) => {
                let outcome = engine.update_from_html(markup);
                info!(step = index, outcome = outcome_name(&outcome), "applied markup");
            }
            Step::Json(value) => {
                let document = parse_value(value.clone())?;
                engine.update_from_json(document)?;
            }
            Step::WaitMs(ms) => {
                clock.advance(Duration::from_millis(*ms));
                engine.tick()?;
            }
            Step::Save(true) => {
                engine.save_changes()?;
            }
            Step::Reset(true) => engine.reset_to_original(),
            Step::Save(false) | Step::Reset(false) => {}
        }
        drain(&snapshots, out)?;
    }

    engine.close();
    Ok(())
}

fn drain(snapshots: &Receiver<Snapshot>, out: &mut impl Write) -> Result<(), ReplayError> {
    for snapshot in snapshots.try_iter() {
        serde_json::to_writer(&mut *out, &snapshot).map_err(io::Error::from)?;
        writeln!(out)?;
    }
    Ok(())
}

fn outcome_name(outcome: &UpdateOutcome) -> &'static str {
    match outcome {
        UpdateOutcome::Unchanged => "unchanged",
        UpdateOutcome::Rejected { .. } => "rejected",
        UpdateOutcome::RolledBack { .. } => "rolled-back",
        UpdateOutcome::Accepted { .. } => "accepted",
    }
}
